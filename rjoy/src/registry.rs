//! Primitive registry: the process-wide name → builtin map.
//!
//! Populated once from the per-family `install` functions and read-only
//! afterwards. Every primitive carries its required stack depth (checked
//! before dispatch, so underflow errors always name the word) and a short
//! signature string surfaced by `help`/`helpdetail`/`manual`.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::EvalResult;
use crate::eval::Evaluator;

/// Implementation of a builtin word.
pub type PrimitiveFn = fn(&mut Evaluator) -> EvalResult<()>;

/// A registered builtin word.
#[derive(Debug, Clone, Copy)]
pub struct Primitive {
    pub name: &'static str,
    /// Required stack depth, validated before dispatch.
    pub arity: usize,
    /// Joy signature, e.g. `"X Y  ->  Y X"`.
    pub sig: &'static str,
    pub run: PrimitiveFn,
}

/// Name → primitive map.
#[derive(Debug, Default)]
pub struct Registry {
    words: HashMap<&'static str, Primitive>,
}

impl Registry {
    pub fn register(&mut self, primitive: Primitive) {
        self.words.insert(primitive.name, primitive);
    }

    pub fn lookup(&self, name: &str) -> Option<&Primitive> {
        self.words.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.words.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.words.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// The global registry, assembled once at first use.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::default();
    crate::eval::stack_ops::install(&mut registry);
    crate::eval::arithmetic::install(&mut registry);
    crate::eval::logic::install(&mut registry);
    crate::eval::aggregate::install(&mut registry);
    crate::eval::types_ops::install(&mut registry);
    crate::eval::combinators::install(&mut registry);
    crate::eval::io::install(&mut registry);
    crate::eval::system::install(&mut registry);
    registry
});

/// Look up a primitive in the global registry.
pub fn lookup(name: &str) -> Option<&'static Primitive> {
    REGISTRY.lookup(name)
}

/// Whether a name is a builtin.
pub fn is_builtin(name: &str) -> bool {
    REGISTRY.contains(name)
}
