//! Name environments for expression evaluation.
//!
//! A `Scope` pairs two environments: the outer (ambient) table supplied by the
//! binding layer and the inner (local) table of the call site. Lookups try the
//! inner table first.

use indexmap::IndexMap;

use crate::Value;

/// An ordered name → value table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Env {
    vars: IndexMap<String, Value>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Env::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Bind `name`, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.vars.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Env {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Env::new();
        env.extend(iter);
        env
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Env {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

/// Two-tier, read-only view used while evaluating one markup document.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    outer: &'a Env,
    inner: &'a Env,
}

impl<'a> Scope<'a> {
    pub fn new(outer: &'a Env, inner: &'a Env) -> Self {
        Self { outer, inner }
    }

    /// Resolve `name`, inner environment first.
    pub fn lookup(&self, name: &str) -> Option<&'a Value> {
        self.inner.get(name).or_else(|| self.outer.get(name))
    }
}
