// Registry of resolver classes

use crate::class::ClassRef;
use std::collections::HashSet;

/// Every class registered as a resolver provider, in first-registration order
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassRef>,
    seen: HashSet<ClassRef>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `class`; returns `false` if it was already present
    pub fn register(&mut self, class: ClassRef) -> bool {
        if !self.seen.insert(class) {
            return false;
        }
        self.classes.push(class);
        true
    }

    pub fn get_all(&self) -> &[ClassRef] {
        &self.classes
    }

    pub fn contains(&self, class: &ClassRef) -> bool {
        self.seen.contains(class)
    }

    /// Registration position of `class`
    pub fn position(&self, class: &ClassRef) -> Option<usize> {
        self.classes.iter().position(|c| c == class)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
        self.seen.clear();
    }
}
