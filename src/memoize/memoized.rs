//! Memoized Callable Module
//!
//! Wraps a callable so repeated calls with equal arguments are served from
//! the cache.

use tracing::debug;

use crate::cache::{Identity, LruCache};
use crate::codec::{Codec, JsonCodec};
use crate::config::LruConfig;
use crate::error::Result;
use crate::memoize::{CallArgs, HashStrategy, PlainHash, TypedHash};
use crate::store::StoreClient;
use crate::value::Value;

// == Memoized ==
/// A callable whose results are cached in an [`LruCache`].
///
/// There is no single-flight de-duplication: concurrent misses on the same
/// arguments each invoke the callable, and the last write wins.
pub struct Memoized<S, F, C = JsonCodec> {
    func: F,
    strategy: Box<dyn HashStrategy>,
    cache: LruCache<S, C>,
}

impl<S, F, C> Memoized<S, F, C>
where
    S: StoreClient,
    C: Codec,
    F: Fn(&CallArgs) -> Value,
{
    pub fn new(func: F, strategy: Box<dyn HashStrategy>, cache: LruCache<S, C>) -> Self {
        Self {
            func,
            strategy,
            cache,
        }
    }

    // == Call ==
    /// Returns the cached result for `args`, invoking the callable and
    /// caching its result on a miss.
    ///
    /// Fails with a configuration error, before touching the store, when any
    /// argument is unhashable.
    pub fn call(&self, args: &CallArgs) -> Result<Value> {
        let key = self.key_for(args)?;

        if let Some(value) = self.cache.get(&key)? {
            return Ok(value);
        }

        debug!("Memoized miss on {} for {}", self.cache.identity(), key);
        let value = (self.func)(args);
        self.cache.set(&key, value.clone())?;
        Ok(value)
    }

    /// The cache key `args` map to: their hash as `0x`-prefixed hex.
    pub fn key_for(&self, args: &CallArgs) -> Result<String> {
        Ok(format!("{:#x}", self.strategy.hash_args(args)?))
    }

    pub fn cache(&self) -> &LruCache<S, C> {
        &self.cache
    }
}

// == Memoize Builder ==
/// Builds a [`Memoized`] callable scoped to the callable's identity.
///
/// ```
/// use std::sync::Arc;
/// use redis_lru::{CallArgs, MemoryStore, Memoize, Value};
///
/// let store = Arc::new(MemoryStore::new());
/// let square = Memoize::for_callable(module_path!(), "square")
///     .max_size(20)
///     .wrap(store, |args: &CallArgs| {
///         let x = args.get(0).and_then(Value::as_i64).unwrap_or(0);
///         Value::Int(x * x)
///     })
///     .unwrap();
///
/// assert_eq!(square.call(&CallArgs::new().arg(3)).unwrap(), Value::Int(9));
/// ```
#[derive(Debug)]
pub struct Memoize {
    scope: String,
    name: String,
    config: LruConfig,
    typed: bool,
    strategy: Option<Box<dyn HashStrategy>>,
}

impl Memoize {
    /// Starts a builder for the callable `name` declared in module `scope`,
    /// typically `module_path!()`.
    pub fn for_callable(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
            config: LruConfig::default(),
            typed: false,
            strategy: None,
        }
    }

    pub fn config(mut self, config: LruConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.config.max_size = max_size;
        self
    }

    pub fn expiration(mut self, expiration: u64) -> Self {
        self.config.expiration = expiration;
        self
    }

    /// Includes argument types in the hash, so `f(1)` and `f(1.0)` are
    /// cached separately.
    pub fn typed(mut self, typed: bool) -> Self {
        self.typed = typed;
        self
    }

    /// Uses a custom hash strategy, overriding [`Memoize::typed`].
    pub fn strategy(mut self, strategy: impl HashStrategy + 'static) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    /// The identity the built engine is scoped to.
    pub fn identity(&self) -> Result<Identity> {
        Identity::for_callable(&self.scope, &self.name)
    }

    /// Wraps `func` with a new engine over `client`.
    pub fn wrap<S, F>(self, client: S, func: F) -> Result<Memoized<S, F>>
    where
        S: StoreClient,
        F: Fn(&CallArgs) -> Value,
    {
        let identity = self.identity()?;
        let cache = LruCache::from_identity(client, identity, self.config.clone(), JsonCodec)?;
        Ok(self.wrap_with_cache(cache, func))
    }

    /// Wraps `func` with a caller-supplied engine. The builder's scope and
    /// config are ignored.
    pub fn wrap_with_cache<S, C, F>(self, cache: LruCache<S, C>, func: F) -> Memoized<S, F, C>
    where
        S: StoreClient,
        C: Codec,
        F: Fn(&CallArgs) -> Value,
    {
        let strategy = match self.strategy {
            Some(strategy) => strategy,
            None if self.typed => Box::new(TypedHash),
            None => Box::new(PlainHash),
        };
        Memoized::new(func, strategy, cache)
    }
}
