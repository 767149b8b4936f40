//! Call Arguments Module
//!
//! The positional and keyword arguments of one memoized call.

use std::collections::BTreeMap;

use crate::value::Value;

// == Call Args ==
/// Arguments passed to a memoized callable.
///
/// Keyword arguments are kept sorted by name, so the order they were supplied
/// in does not affect the call's hash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword argument, replacing any earlier value under `name`.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Positional argument at `index`, if supplied.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Keyword argument named `name`, if supplied.
    pub fn get_kw(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name)
    }
}

impl<T: Into<Value>> FromIterator<T> for CallArgs {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            positional: iter.into_iter().map(Into::into).collect(),
            keyword: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let args = CallArgs::new().arg(1).arg("two").kwarg("limit", 10);

        assert_eq!(args.get(0), Some(&Value::Int(1)));
        assert_eq!(args.get(1), Some(&Value::from("two")));
        assert_eq!(args.get(2), None);
        assert_eq!(args.get_kw("limit"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_keyword_order_is_irrelevant() {
        let a = CallArgs::new().kwarg("x", 1).kwarg("y", 2);
        let b = CallArgs::new().kwarg("y", 2).kwarg("x", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_collect_positional() {
        let args: CallArgs = vec![1, 2, 3].into_iter().collect();
        assert_eq!(args.positional.len(), 3);
        assert!(args.keyword.is_empty());
    }
}
