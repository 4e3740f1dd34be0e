//! Property conditions and the composite predicate a search evaluates.
//!
//! A query accumulates one [`PropertyCondition`] per property; at execution
//! time the set is compiled into a [`CompositeCondition`], the logical AND of
//! every configured condition. The composite is rebuilt on every search call,
//! so conditions added after one search apply to the next.

use crate::property::{PropertyId, PropertyValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single property predicate: the node's value for `property` must equal
/// `value` (case-insensitively for strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyCondition {
    pub property: PropertyId,
    pub value: PropertyValue,
}

impl PropertyCondition {
    pub fn new(property: PropertyId, value: impl Into<PropertyValue>) -> Self {
        Self {
            property,
            value: value.into(),
        }
    }

    /// Whether a node's actual value satisfies this condition. A node that
    /// does not carry the property never matches.
    pub fn matches(&self, actual: Option<&PropertyValue>) -> bool {
        match actual {
            Some(actual) => self.value.matches(actual),
            None => false,
        }
    }
}

/// Read-only property lookup on a single node, used to evaluate conditions.
pub trait PropertySource {
    fn property(&self, id: PropertyId) -> Option<PropertyValue>;
}

impl PropertySource for HashMap<PropertyId, PropertyValue> {
    fn property(&self, id: PropertyId) -> Option<PropertyValue> {
        self.get(&id).cloned()
    }
}

/// Ordered collection of property conditions with replace-on-conflict
/// semantics: at most one condition per distinct programmatic name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSet {
    conditions: Vec<PropertyCondition>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition. Any existing condition whose property has the same
    /// programmatic name is removed first, so the new entry wins and lands at
    /// the end of the order.
    pub fn push(&mut self, condition: PropertyCondition) {
        let name = condition.property.programmatic_name();
        self.conditions
            .retain(|existing| existing.property.programmatic_name() != name);
        self.conditions.push(condition);
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyCondition> {
        self.conditions.iter()
    }

    /// Compile the current conditions into one composite predicate.
    pub fn compile(&self) -> CompositeCondition {
        CompositeCondition {
            conditions: self.conditions.clone(),
        }
    }
}

/// The logical AND of all conditions configured at the moment a search
/// executes. The AND of the empty set is true, so an unconditioned composite
/// matches every node in scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeCondition {
    conditions: Vec<PropertyCondition>,
}

impl CompositeCondition {
    pub fn conditions(&self) -> &[PropertyCondition] {
        &self.conditions
    }

    pub fn is_unconditional(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate the composite against one node's properties.
    pub fn matches<S: PropertySource + ?Sized>(&self, source: &S) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(source.property(condition.property).as_ref()))
    }
}
