//! Declarative node search against a tree provider.
//!
//! A [`SearchQuery`] accumulates property predicates, a traversal scope, and
//! an optional explicit root, then compiles them into one composite predicate
//! per execution and delegates the walk to the provider.

use crate::condition::{CompositeCondition, ConditionSet, PropertyCondition};
use crate::property::{PropertyId, PropertyValue};
use crate::provider::{NodeId, ProviderError, TreeProvider};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which relationship to the search root a query traverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// The root alone.
    Element,
    /// Direct children of the root.
    Children,
    /// All descendants of the root, excluding the root itself.
    #[default]
    Descendants,
    /// The root and all of its descendants.
    Subtree,
}

/// Accumulates search conditions and executes them against a provider.
///
/// A query is a plain value: every `with_*` call consumes it and returns the
/// updated value, so configuration chains without shared mutable state. One
/// query represents one evolving set of conditions; executing a search reads
/// the query but never mutates it, and conditions added after one search
/// apply to the next.
///
/// ```
/// use axtree_core::{SearchQuery, SearchScope};
///
/// let query = SearchQuery::new()
///     .with_name("Submit")
///     .with_class_name("Button")
///     .with_scope(SearchScope::Descendants);
/// assert_eq!(query.compile().conditions().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    conditions: ConditionSet,
    scope: SearchScope,
    root: Option<NodeId>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match on the node's display name.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_property(PropertyId::Name, name.into())
    }

    /// Match on the node's stable automation id.
    pub fn with_automation_id(self, id: impl Into<String>) -> Self {
        self.with_property(PropertyId::AutomationId, id.into())
    }

    /// Match on the node's class name.
    pub fn with_class_name(self, class_name: impl Into<String>) -> Self {
        self.with_property(PropertyId::ClassName, class_name.into())
    }

    /// Match on the node's help text.
    pub fn with_help_text(self, help_text: impl Into<String>) -> Self {
        self.with_property(PropertyId::HelpText, help_text.into())
    }

    /// Match on the node's control type.
    pub fn with_control_type(self, control_type: impl Into<String>) -> Self {
        self.with_property(PropertyId::ControlType, control_type.into())
    }

    /// Add a condition on an arbitrary property.
    ///
    /// An existing condition on the same property (by programmatic name) is
    /// replaced, so the compiled composite never holds two conditions on one
    /// property. No validation of `value` against the property's expected
    /// type happens here; a mismatched value simply never matches.
    pub fn with_property(mut self, property: PropertyId, value: impl Into<PropertyValue>) -> Self {
        self.conditions.push(PropertyCondition::new(property, value));
        self
    }

    /// Set the traversal scope. Last call wins.
    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    /// Search under the given node instead of the provider's desktop. Last
    /// call wins. The query does not own the handle; validity is the
    /// provider's business.
    pub fn with_root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    pub fn scope(&self) -> SearchScope {
        self.scope
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Compile the composite predicate a search executed now would evaluate.
    pub fn compile(&self) -> CompositeCondition {
        self.conditions.compile()
    }

    /// First matching node under the effective root, or `None` when nothing
    /// matches.
    ///
    /// Blocks on the provider. Repeated calls re-query the live tree and may
    /// return different outcomes as it changes.
    pub fn find_first(&self, provider: &dyn TreeProvider) -> Result<Option<NodeId>, ProviderError> {
        let condition = self.compile();
        let root = self.effective_root(provider)?;
        debug!(
            root = %root,
            scope = ?self.scope,
            conditions = condition.conditions().len(),
            "find_first"
        );
        provider.find_first(root, self.scope, &condition)
    }

    /// All matching nodes under the effective root, in provider order.
    ///
    /// The sequence is finite (bounded by tree size at evaluation time) and
    /// one-shot; it is not restartable. Calling `find_all` again runs a fresh
    /// query and reflects the tree as it is then; nothing is memoized.
    pub fn find_all<'a>(
        &self,
        provider: &'a dyn TreeProvider,
    ) -> Result<Box<dyn Iterator<Item = NodeId> + 'a>, ProviderError> {
        let condition = self.compile();
        let root = self.effective_root(provider)?;
        debug!(
            root = %root,
            scope = ?self.scope,
            conditions = condition.conditions().len(),
            "find_all"
        );
        provider.find_all(root, self.scope, &condition)
    }

    fn effective_root(&self, provider: &dyn TreeProvider) -> Result<NodeId, ProviderError> {
        match self.root {
            Some(root) => Ok(root),
            None => provider.desktop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CapabilityHandle, CapabilityId};
    use std::cell::RefCell;

    /// Records the arguments of the last search call it receives.
    struct RecordingProvider {
        desktop: NodeId,
        last_root: RefCell<Option<NodeId>>,
        last_scope: RefCell<Option<SearchScope>>,
        last_condition: RefCell<Option<CompositeCondition>>,
    }

    impl RecordingProvider {
        fn new() -> Self {
            Self {
                desktop: NodeId(0),
                last_root: RefCell::new(None),
                last_scope: RefCell::new(None),
                last_condition: RefCell::new(None),
            }
        }

        fn record(&self, root: NodeId, scope: SearchScope, condition: &CompositeCondition) {
            *self.last_root.borrow_mut() = Some(root);
            *self.last_scope.borrow_mut() = Some(scope);
            *self.last_condition.borrow_mut() = Some(condition.clone());
        }
    }

    impl TreeProvider for RecordingProvider {
        fn desktop(&self) -> Result<NodeId, ProviderError> {
            Ok(self.desktop)
        }

        fn focused(&self) -> Result<Option<NodeId>, ProviderError> {
            Ok(None)
        }

        fn node_at(&self, _x: f64, _y: f64) -> Result<Option<NodeId>, ProviderError> {
            Ok(None)
        }

        fn property(
            &self,
            _node: NodeId,
            _id: PropertyId,
        ) -> Result<Option<PropertyValue>, ProviderError> {
            Ok(None)
        }

        fn find_first(
            &self,
            root: NodeId,
            scope: SearchScope,
            condition: &CompositeCondition,
        ) -> Result<Option<NodeId>, ProviderError> {
            self.record(root, scope, condition);
            Ok(None)
        }

        fn find_all<'a>(
            &'a self,
            root: NodeId,
            scope: SearchScope,
            condition: &CompositeCondition,
        ) -> Result<Box<dyn Iterator<Item = NodeId> + 'a>, ProviderError> {
            self.record(root, scope, condition);
            Ok(Box::new(std::iter::empty()))
        }

        fn capability(
            &self,
            _node: NodeId,
            _id: CapabilityId,
        ) -> Result<Option<CapabilityHandle>, ProviderError> {
            Ok(None)
        }
    }

    #[test]
    fn test_default_scope_is_descendants() {
        assert_eq!(SearchQuery::new().scope(), SearchScope::Descendants);
    }

    #[test]
    fn test_scope_last_call_wins() {
        let query = SearchQuery::new()
            .with_scope(SearchScope::Children)
            .with_scope(SearchScope::Subtree);
        assert_eq!(query.scope(), SearchScope::Subtree);
    }

    #[test]
    fn test_root_last_call_wins() {
        let query = SearchQuery::new()
            .with_root(NodeId(3))
            .with_root(NodeId(9));
        assert_eq!(query.root(), Some(NodeId(9)));
    }

    #[test]
    fn test_same_property_collapses_across_fluent_methods() {
        // with_class_name and the general form address the same identifier.
        let query = SearchQuery::new()
            .with_class_name("Slider")
            .with_property(PropertyId::ClassName, "Button");
        let composite = query.compile();
        assert_eq!(composite.conditions().len(), 1);
        assert_eq!(
            composite.conditions()[0].value,
            PropertyValue::from("Button")
        );
    }

    #[test]
    fn test_absent_root_falls_back_to_desktop() {
        let provider = RecordingProvider::new();
        let query = SearchQuery::new().with_name("Submit");
        query.find_first(&provider).unwrap();
        assert_eq!(*provider.last_root.borrow(), Some(NodeId(0)));
    }

    #[test]
    fn test_explicit_root_is_used() {
        let provider = RecordingProvider::new();
        let query = SearchQuery::new().with_root(NodeId(17));
        query.find_first(&provider).unwrap();
        assert_eq!(*provider.last_root.borrow(), Some(NodeId(17)));
    }

    #[test]
    fn test_find_all_passes_scope_and_conditions() {
        let provider = RecordingProvider::new();
        let query = SearchQuery::new()
            .with_name("Volume")
            .with_scope(SearchScope::Children);
        let _ = query.find_all(&provider).unwrap();
        assert_eq!(*provider.last_scope.borrow(), Some(SearchScope::Children));
        let condition = provider.last_condition.borrow().clone().unwrap();
        assert_eq!(condition.conditions().len(), 1);
    }

    #[test]
    fn test_query_not_consumed_by_search() {
        let provider = RecordingProvider::new();
        let query = SearchQuery::new().with_name("Submit");
        query.find_first(&provider).unwrap();
        // Conditions added after one search apply to the next.
        let query = query.with_class_name("Button");
        query.find_first(&provider).unwrap();
        let condition = provider.last_condition.borrow().clone().unwrap();
        assert_eq!(condition.conditions().len(), 2);
    }
}
