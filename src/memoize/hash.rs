//! Argument Hashing Module
//!
//! Strategies turning call arguments into the key a result is cached under.

use std::fmt::Debug;
use std::hash::Hasher;

use twox_hash::XxHash64;

use crate::error::{CacheError, Result};
use crate::memoize::CallArgs;
use crate::value::Value;

const TAG_NULL: u8 = 0;
const TAG_NUMBER: u8 = 1;
const TAG_FLOAT: u8 = 2;
const TAG_STRING: u8 = 3;
const TAG_KEYWORDS: u8 = 0xff;

// == Hash Strategy ==
/// Computes a deterministic hash of a call's arguments.
///
/// Implementations must produce the same hash for the same arguments in
/// every process, since results are shared through the store.
pub trait HashStrategy: Send + Sync + Debug {
    fn hash_args(&self, args: &CallArgs) -> Result<u64>;
}

/// Hashes argument values only. Numerically equal ints, floats and bools
/// (`1`, `1.0`, `true`) hash alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHash;

/// Hashes argument values together with their runtime types, so `1` and
/// `1.0` hash differently.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedHash;

impl HashStrategy for PlainHash {
    fn hash_args(&self, args: &CallArgs) -> Result<u64> {
        let mut hasher = XxHash64::with_seed(0);

        hasher.write_usize(args.positional.len());
        for (index, value) in args.positional.iter().enumerate() {
            hash_value(&mut hasher, value)
                .map_err(|kind| unhashable(&format!("positional argument {}", index), kind))?;
        }

        hasher.write_u8(TAG_KEYWORDS);
        hasher.write_usize(args.keyword.len());
        for (name, value) in &args.keyword {
            hash_str(&mut hasher, name);
            hash_value(&mut hasher, value)
                .map_err(|kind| unhashable(&format!("keyword argument {:?}", name), kind))?;
        }

        Ok(hasher.finish())
    }
}

impl HashStrategy for TypedHash {
    fn hash_args(&self, args: &CallArgs) -> Result<u64> {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write_u64(PlainHash.hash_args(args)?);

        for value in &args.positional {
            hash_str(&mut hasher, value.type_name());
        }
        hasher.write_u8(TAG_KEYWORDS);
        for value in args.keyword.values() {
            hash_str(&mut hasher, value.type_name());
        }

        Ok(hasher.finish())
    }
}

fn unhashable(position: &str, kind: &str) -> CacheError {
    CacheError::Configuration(format!(
        "All arguments to memoized functions must be hashable: {} is a {}",
        position, kind
    ))
}

fn hash_str(hasher: &mut XxHash64, s: &str) {
    hasher.write_usize(s.len());
    hasher.write(s.as_bytes());
}

/// Feeds one scalar into the hasher, or names the unhashable kind.
fn hash_value(hasher: &mut XxHash64, value: &Value) -> std::result::Result<(), &'static str> {
    match value {
        Value::Null => hasher.write_u8(TAG_NULL),
        Value::Bool(b) => hash_integer(hasher, i64::from(*b)),
        Value::Int(i) => hash_integer(hasher, *i),
        Value::Float(f) => match integral(*f) {
            Some(i) => hash_integer(hasher, i),
            None => {
                hasher.write_u8(TAG_FLOAT);
                hasher.write_u64(f.to_bits());
            }
        },
        Value::String(s) => {
            hasher.write_u8(TAG_STRING);
            hash_str(hasher, s);
        }
        Value::List(_) | Value::Map(_) => return Err(value.type_name()),
    }
    Ok(())
}

fn hash_integer(hasher: &mut XxHash64, i: i64) {
    hasher.write_u8(TAG_NUMBER);
    hasher.write_i64(i);
}

/// The integer a float is exactly equal to, if any.
fn integral(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}
