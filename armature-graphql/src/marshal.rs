//! Parameter marshaling: mapping resolver arguments onto method parameters.

use crate::error::ResolverError;
use crate::metadata::{MAX_PARAMETERS, ParamKind, ParameterMetadata};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The four values a GraphQL engine passes to a resolver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverInput {
    pub parent: Value,
    pub args: Value,
    pub ctx: Value,
    pub info: Value,
}

impl ResolverInput {
    pub fn new(parent: Value, args: Value, ctx: Value, info: Value) -> Self {
        Self {
            parent,
            args,
            ctx,
            info,
        }
    }

    fn select(&self, param: &ParameterMetadata) -> Option<Value> {
        let whole = match param.kind {
            ParamKind::Parent => return Some(self.parent.clone()),
            ParamKind::Info => return Some(self.info.clone()),
            ParamKind::Args => &self.args,
            ParamKind::Ctx => &self.ctx,
        };

        match &param.key {
            Some(key) => whole.get(key).cloned(),
            None => Some(whole.clone()),
        }
    }
}

/// Positional arguments for a resolver method.
///
/// A slot is `None` when no parameter annotation targets it, mirroring an
/// undefined argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodArgs {
    slots: Vec<Option<Value>>,
}

impl MethodArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` at `index`, growing the list with undefined slots.
    ///
    /// Indices at or past [`MAX_PARAMETERS`] are ignored.
    pub fn set(&mut self, index: usize, value: Option<Value>) {
        if index >= MAX_PARAMETERS {
            return;
        }
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = value;
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Take the value at `index`, leaving the slot undefined
    pub fn take(&mut self, index: usize) -> Option<Value> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Take the value at `index` and convert it to `T`.
    ///
    /// An undefined slot converts like `null`, so `Option<T>` parameters
    /// accept missing arguments.
    pub fn extract<T: DeserializeOwned>(&mut self, index: usize) -> Result<T, ResolverError> {
        let value = self.take(index).unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|source| ResolverError::Argument { index, source })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Value>> {
        self.slots.iter().map(Option::as_ref)
    }

    pub fn into_vec(self) -> Vec<Option<Value>> {
        self.slots
    }
}

impl From<Vec<Option<Value>>> for MethodArgs {
    fn from(slots: Vec<Option<Value>>) -> Self {
        Self { slots }
    }
}

/// Build the argument list of a method from its parameter bindings.
///
/// Bindings are applied in order, so a repeated index keeps the last one.
pub fn marshal(params: &[ParameterMetadata], input: &ResolverInput) -> MethodArgs {
    let mut args = MethodArgs::new();
    for param in params {
        args.set(param.index, input.select(param));
    }
    args
}
