use std::collections::BTreeMap;

use serde_json::Value;

use crate::ModuleKey;

/// Positional arguments of a package call, in call order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// First positional argument interpreted as a module key.
    ///
    /// Module keys are opaque non-negative integers by contract; a missing
    /// first argument or any other value shape reads as absent.
    pub fn module_key(&self) -> Option<ModuleKey> {
        self.0.first().and_then(Value::as_u64)
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Keyword arguments of a package call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KwArgs(BTreeMap<String, Value>);

impl KwArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Keyword argument as a string, `None` when absent or not a string.
    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for KwArgs {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
