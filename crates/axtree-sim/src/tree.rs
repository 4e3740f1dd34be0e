//! Simulated in-memory accessibility tree.
//!
//! [`SimTree`] implements [`TreeProvider`] end to end: a mutable tree of
//! nodes with properties, bounds, and capability state, so the full search
//! and capability stack can be exercised without a platform service. The
//! tree can change between queries (nodes added, removed, renamed, enabled,
//! disabled), which is exactly what the provider contract has to survive.
//!
//! The model is single-threaded by design, like the layer it simulates;
//! state lives behind `Rc<RefCell<_>>` so capability handles resolved earlier
//! keep observing live state.

use axtree_core::{
    CapabilityHandle, CapabilityId, CompositeCondition, InvokeCapability, NodeId, PropertyId,
    PropertySource, PropertyValue, ProviderError, RangeValueCapability, SearchScope, TreeProvider,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// Axis-aligned bounds of a node, in desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && y >= self.y && x <= self.x + self.width && y <= self.y + self.height
    }
}

/// Range-value state of a node that supports the range-value capability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeSpec {
    pub value: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub small_change: f64,
    pub large_change: f64,
    pub read_only: bool,
}

impl Default for RangeSpec {
    fn default() -> Self {
        Self {
            value: 0.0,
            minimum: 0.0,
            maximum: 100.0,
            small_change: 1.0,
            large_change: 10.0,
            read_only: false,
        }
    }
}

/// Declarative description of one node (and, in fixtures, its subtree).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub name: Option<String>,
    pub automation_id: Option<String>,
    pub class_name: Option<String>,
    pub help_text: Option<String>,
    pub control_type: Option<String>,
    pub enabled: bool,
    pub focused: bool,
    pub bounds: Option<Rect>,
    /// Whether the node supports the invoke capability.
    pub invokable: bool,
    /// Range-value capability state, when supported.
    pub range: Option<RangeSpec>,
    pub children: Vec<NodeSpec>,
}

impl Default for NodeSpec {
    fn default() -> Self {
        Self {
            name: None,
            automation_id: None,
            class_name: None,
            help_text: None,
            control_type: None,
            enabled: true,
            focused: false,
            bounds: None,
            invokable: false,
            range: None,
            children: Vec::new(),
        }
    }
}

impl NodeSpec {
    /// A node with just a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
struct NodeData {
    parent: Option<u64>,
    children: Vec<u64>,
    properties: HashMap<PropertyId, PropertyValue>,
    enabled: bool,
    bounds: Option<Rect>,
    invokable: bool,
    invoke_count: u64,
    range: Option<RangeSpec>,
}

impl NodeData {
    fn from_spec(spec: &NodeSpec, parent: Option<u64>) -> Self {
        let mut properties = HashMap::new();
        let mut put = |id: PropertyId, value: &Option<String>| {
            if let Some(value) = value {
                properties.insert(id, PropertyValue::Str(value.clone()));
            }
        };
        put(PropertyId::Name, &spec.name);
        put(PropertyId::AutomationId, &spec.automation_id);
        put(PropertyId::ClassName, &spec.class_name);
        put(PropertyId::HelpText, &spec.help_text);
        put(PropertyId::ControlType, &spec.control_type);

        Self {
            parent,
            children: Vec::new(),
            properties,
            enabled: spec.enabled,
            bounds: spec.bounds,
            invokable: spec.invokable,
            invoke_count: 0,
            range: spec.range,
        }
    }
}

impl PropertySource for NodeData {
    fn property(&self, id: PropertyId) -> Option<PropertyValue> {
        match id {
            PropertyId::IsEnabled => Some(PropertyValue::Bool(self.enabled)),
            _ => self.properties.get(&id).cloned(),
        }
    }
}

#[derive(Debug)]
struct TreeState {
    nodes: HashMap<u64, NodeData>,
    root: u64,
    focused: Option<u64>,
    next_id: u64,
}

impl TreeState {
    fn node(&self, id: NodeId) -> Result<&NodeData, ProviderError> {
        self.nodes.get(&id.0).ok_or(ProviderError::Stale { id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, ProviderError> {
        self.nodes.get_mut(&id.0).ok_or(ProviderError::Stale { id })
    }

    /// Depth-first pre-order over the descendants of `id`. Provider order.
    fn push_descendants(&self, id: u64, out: &mut Vec<u64>) {
        if let Some(data) = self.nodes.get(&id) {
            for &child in &data.children {
                out.push(child);
                self.push_descendants(child, out);
            }
        }
    }

    fn candidates(&self, root: u64, scope: SearchScope) -> Vec<u64> {
        match scope {
            SearchScope::Element => vec![root],
            SearchScope::Children => self
                .nodes
                .get(&root)
                .map(|data| data.children.clone())
                .unwrap_or_default(),
            SearchScope::Descendants => {
                let mut out = Vec::new();
                self.push_descendants(root, &mut out);
                out
            }
            SearchScope::Subtree => {
                let mut out = vec![root];
                self.push_descendants(root, &mut out);
                out
            }
        }
    }

    fn matching(
        &self,
        root: NodeId,
        scope: SearchScope,
        condition: &CompositeCondition,
    ) -> Result<Vec<NodeId>, ProviderError> {
        // Searching under a dead root is a stale-handle failure, not an
        // empty result.
        self.node(root)?;
        let matches: Vec<NodeId> = self
            .candidates(root.0, scope)
            .into_iter()
            .filter(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|data| condition.matches(data))
            })
            .map(NodeId)
            .collect();
        trace!(root = %root, ?scope, matches = matches.len(), "evaluated search");
        Ok(matches)
    }

    fn hit_test(&self, id: u64, x: f64, y: f64, depth: usize, best: &mut Option<(usize, u64)>) {
        if let Some(data) = self.nodes.get(&id) {
            if data.bounds.is_some_and(|b| b.contains(x, y))
                && best.map_or(true, |(d, _)| depth >= d)
            {
                *best = Some((depth, id));
            }
            for &child in &data.children {
                self.hit_test(child, x, y, depth + 1, best);
            }
        }
    }
}

/// A mutable simulated accessibility tree implementing [`TreeProvider`].
///
/// Created with a single desktop root; populate it with [`SimTree::add_node`]
/// or load a fixture via [`SimTree::from_yaml`] / [`SimTree::from_json`].
/// Removing a node invalidates its id: later use of that id yields
/// [`ProviderError::Stale`].
#[derive(Debug, Clone)]
pub struct SimTree {
    state: Rc<RefCell<TreeState>>,
}

impl SimTree {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            0,
            NodeData::from_spec(
                &NodeSpec {
                    name: Some("Desktop".into()),
                    control_type: Some("Desktop".into()),
                    ..NodeSpec::default()
                },
                None,
            ),
        );
        Self {
            state: Rc::new(RefCell::new(TreeState {
                nodes,
                root: 0,
                focused: None,
                next_id: 1,
            })),
        }
    }

    /// The desktop root.
    pub fn root(&self) -> NodeId {
        NodeId(self.state.borrow().root)
    }

    /// Insert a node (and the subtree described by `spec.children`) under
    /// `parent`. Returns the id of the inserted node.
    pub fn add_node(&self, parent: NodeId, spec: NodeSpec) -> Result<NodeId, ProviderError> {
        let mut state = self.state.borrow_mut();
        state.node(parent)?;
        let id = Self::insert(&mut state, parent.0, &spec);
        debug!(node = %id, parent = %parent, "added node");
        Ok(id)
    }

    fn insert(state: &mut TreeState, parent: u64, spec: &NodeSpec) -> NodeId {
        let id = state.next_id;
        state.next_id += 1;
        state.nodes.insert(id, NodeData::from_spec(spec, Some(parent)));
        if let Some(data) = state.nodes.get_mut(&parent) {
            data.children.push(id);
        }
        if spec.focused {
            state.focused = Some(id);
        }
        for child in &spec.children {
            Self::insert(state, id, child);
        }
        NodeId(id)
    }

    /// Remove a node and its whole subtree. Every removed id becomes stale.
    pub fn remove_node(&self, node: NodeId) -> Result<(), ProviderError> {
        let mut state = self.state.borrow_mut();
        if node.0 == state.root {
            return Err(ProviderError::Rejected {
                id: node,
                reason: "the desktop root cannot be removed".into(),
            });
        }
        let parent = state.node(node)?.parent;
        let mut doomed = vec![node.0];
        state.push_descendants(node.0, &mut doomed);
        for id in &doomed {
            state.nodes.remove(id);
            if state.focused == Some(*id) {
                state.focused = None;
            }
        }
        if let Some(parent) = parent {
            if let Some(data) = state.nodes.get_mut(&parent) {
                data.children.retain(|child| *child != node.0);
            }
        }
        debug!(node = %node, removed = doomed.len(), "removed subtree");
        Ok(())
    }

    /// Set one property of a node. Setting `IsEnabled` with a boolean value
    /// changes the enablement state.
    pub fn set_property(
        &self,
        node: NodeId,
        id: PropertyId,
        value: impl Into<PropertyValue>,
    ) -> Result<(), ProviderError> {
        let mut state = self.state.borrow_mut();
        let data = state.node_mut(node)?;
        let value = value.into();
        if id == PropertyId::IsEnabled {
            match value {
                PropertyValue::Bool(enabled) => data.enabled = enabled,
                other => {
                    return Err(ProviderError::Rejected {
                        id: node,
                        reason: format!("IsEnabled takes a boolean, got {}", other),
                    });
                }
            }
        } else {
            data.properties.insert(id, value);
        }
        Ok(())
    }

    pub fn set_enabled(&self, node: NodeId, enabled: bool) -> Result<(), ProviderError> {
        self.set_property(node, PropertyId::IsEnabled, enabled)
    }

    /// Move input focus, or clear it with `None`.
    pub fn set_focus(&self, node: Option<NodeId>) -> Result<(), ProviderError> {
        let mut state = self.state.borrow_mut();
        if let Some(node) = node {
            state.node(node)?;
        }
        state.focused = node.map(|n| n.0);
        Ok(())
    }

    /// Change a node's range value directly, the way the simulated UI itself
    /// would. Bypasses the read-only flag, which only guards the capability
    /// surface.
    pub fn set_range_value(&self, node: NodeId, value: f64) -> Result<(), ProviderError> {
        let mut state = self.state.borrow_mut();
        let data = state.node_mut(node)?;
        match data.range.as_mut() {
            Some(range) => {
                range.value = value;
                Ok(())
            }
            None => Err(ProviderError::Rejected {
                id: node,
                reason: "node has no range state".into(),
            }),
        }
    }

    /// Install or remove a node's range state, changing whether the node
    /// supports the range-value capability from now on.
    pub fn set_range(&self, node: NodeId, range: Option<RangeSpec>) -> Result<(), ProviderError> {
        let mut state = self.state.borrow_mut();
        state.node_mut(node)?.range = range;
        Ok(())
    }

    /// Flip the read-only flag of a node's range state.
    pub fn set_range_read_only(&self, node: NodeId, read_only: bool) -> Result<(), ProviderError> {
        let mut state = self.state.borrow_mut();
        let data = state.node_mut(node)?;
        match data.range.as_mut() {
            Some(range) => {
                range.read_only = read_only;
                Ok(())
            }
            None => Err(ProviderError::Rejected {
                id: node,
                reason: "node has no range state".into(),
            }),
        }
    }

    /// How often a node's invoke action has fired.
    pub fn invoke_count(&self, node: NodeId) -> Result<u64, ProviderError> {
        Ok(self.state.borrow().node(node)?.invoke_count)
    }

    /// Number of live nodes, the desktop root included.
    pub fn node_count(&self) -> usize {
        self.state.borrow().nodes.len()
    }
}

impl Default for SimTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeProvider for SimTree {
    fn desktop(&self) -> Result<NodeId, ProviderError> {
        Ok(self.root())
    }

    fn focused(&self) -> Result<Option<NodeId>, ProviderError> {
        Ok(self.state.borrow().focused.map(NodeId))
    }

    fn node_at(&self, x: f64, y: f64) -> Result<Option<NodeId>, ProviderError> {
        let state = self.state.borrow();
        let mut best = None;
        state.hit_test(state.root, x, y, 0, &mut best);
        Ok(best.map(|(_, id)| NodeId(id)))
    }

    fn property(
        &self,
        node: NodeId,
        id: PropertyId,
    ) -> Result<Option<PropertyValue>, ProviderError> {
        Ok(self.state.borrow().node(node)?.property(id))
    }

    fn find_first(
        &self,
        root: NodeId,
        scope: SearchScope,
        condition: &CompositeCondition,
    ) -> Result<Option<NodeId>, ProviderError> {
        let state = self.state.borrow();
        Ok(state.matching(root, scope, condition)?.into_iter().next())
    }

    fn find_all<'a>(
        &'a self,
        root: NodeId,
        scope: SearchScope,
        condition: &CompositeCondition,
    ) -> Result<Box<dyn Iterator<Item = NodeId> + 'a>, ProviderError> {
        let state = self.state.borrow();
        let matches = state.matching(root, scope, condition)?;
        Ok(Box::new(matches.into_iter()))
    }

    fn capability(
        &self,
        node: NodeId,
        id: CapabilityId,
    ) -> Result<Option<CapabilityHandle>, ProviderError> {
        let state = self.state.borrow();
        let data = state.node(node)?;
        // Capability presence is independent of enablement: a disabled
        // control still reports its capabilities.
        let handle = match id {
            CapabilityId::Invoke if data.invokable => {
                Some(CapabilityHandle::Invoke(Box::new(SimInvoke {
                    state: Rc::clone(&self.state),
                    node,
                })))
            }
            CapabilityId::RangeValue if data.range.is_some() => {
                Some(CapabilityHandle::RangeValue(Box::new(SimRange {
                    state: Rc::clone(&self.state),
                    node,
                })))
            }
            _ => None,
        };
        trace!(node = %node, capability = %id, present = handle.is_some(), "capability lookup");
        Ok(handle)
    }
}

/// Invoke capability bound to one node of a [`SimTree`].
#[derive(Debug)]
struct SimInvoke {
    state: Rc<RefCell<TreeState>>,
    node: NodeId,
}

impl InvokeCapability for SimInvoke {
    fn invoke(&self) -> Result<(), ProviderError> {
        let mut state = self.state.borrow_mut();
        let node = self.node;
        let data = state.node_mut(node)?;
        if !data.enabled {
            return Err(ProviderError::Disabled { id: node });
        }
        data.invoke_count += 1;
        debug!(node = %node, "invoked");
        Ok(())
    }
}

/// Range-value capability bound to one node of a [`SimTree`].
///
/// Reads and writes go through the live tree state, so a handle resolved
/// before a change observes the state after it.
struct SimRange {
    state: Rc<RefCell<TreeState>>,
    node: NodeId,
}

impl SimRange {
    fn read<T>(&self, op: impl FnOnce(&RangeSpec) -> T) -> Result<T, ProviderError> {
        let state = self.state.borrow();
        let data = state.node(self.node)?;
        match data.range.as_ref() {
            Some(range) => Ok(op(range)),
            None => Err(ProviderError::Provider(format!(
                "range state vanished from node {}",
                self.node
            ))),
        }
    }
}

impl RangeValueCapability for SimRange {
    fn value(&self) -> Result<f64, ProviderError> {
        self.read(|range| range.value)
    }

    fn set_value(&self, value: f64) -> Result<(), ProviderError> {
        let mut state = self.state.borrow_mut();
        let node = self.node;
        let data = state.node_mut(node)?;
        let enabled = data.enabled;
        let range = data.range.as_mut().ok_or_else(|| {
            ProviderError::Provider(format!("range state vanished from node {}", node))
        })?;
        if range.read_only {
            return Err(ProviderError::ReadOnly { id: node });
        }
        if !enabled {
            return Err(ProviderError::Disabled { id: node });
        }
        if value < range.minimum || value > range.maximum {
            return Err(ProviderError::Rejected {
                id: node,
                reason: format!(
                    "value {} outside range [{}, {}]",
                    value, range.minimum, range.maximum
                ),
            });
        }
        range.value = value;
        debug!(node = %node, value, "range value set");
        Ok(())
    }

    fn minimum(&self) -> Result<f64, ProviderError> {
        self.read(|range| range.minimum)
    }

    fn maximum(&self) -> Result<f64, ProviderError> {
        self.read(|range| range.maximum)
    }

    fn small_change(&self) -> Result<f64, ProviderError> {
        self.read(|range| range.small_change)
    }

    fn large_change(&self) -> Result<f64, ProviderError> {
        self.read(|range| range.large_change)
    }

    fn is_read_only(&self) -> Result<bool, ProviderError> {
        self.read(|range| range.read_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axtree_core::ConditionSet;

    fn unconditional() -> CompositeCondition {
        ConditionSet::new().compile()
    }

    fn sample_tree() -> (SimTree, NodeId, NodeId, NodeId) {
        // Desktop
        // └── Window "Settings"
        //     ├── Button "Submit"
        //     └── Panel
        //         └── Button "Cancel"
        let tree = SimTree::new();
        let window = tree
            .add_node(
                tree.root(),
                NodeSpec {
                    name: Some("Settings".into()),
                    control_type: Some("Window".into()),
                    ..NodeSpec::default()
                },
            )
            .unwrap();
        let submit = tree
            .add_node(
                window,
                NodeSpec {
                    name: Some("Submit".into()),
                    class_name: Some("Button".into()),
                    invokable: true,
                    ..NodeSpec::default()
                },
            )
            .unwrap();
        let panel = tree
            .add_node(window, NodeSpec::named("Details"))
            .unwrap();
        tree.add_node(
            panel,
            NodeSpec {
                name: Some("Cancel".into()),
                class_name: Some("Button".into()),
                invokable: true,
                ..NodeSpec::default()
            },
        )
        .unwrap();
        (tree, window, submit, panel)
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let (tree, window, submit, panel) = sample_tree();
        let all: Vec<NodeId> = tree
            .find_all(tree.root(), SearchScope::Descendants, &unconditional())
            .unwrap()
            .collect();
        assert_eq!(all[0], window);
        assert_eq!(all[1], submit);
        assert_eq!(all[2], panel);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_children_scope_excludes_grandchildren() {
        let (tree, window, ..) = sample_tree();
        let children: Vec<NodeId> = tree
            .find_all(tree.root(), SearchScope::Children, &unconditional())
            .unwrap()
            .collect();
        assert_eq!(children, vec![window]);
    }

    #[test]
    fn test_subtree_scope_includes_root() {
        let (tree, window, ..) = sample_tree();
        let subtree: Vec<NodeId> = tree
            .find_all(window, SearchScope::Subtree, &unconditional())
            .unwrap()
            .collect();
        assert_eq!(subtree[0], window);
        assert_eq!(subtree.len(), 4);
    }

    #[test]
    fn test_element_scope_is_root_alone() {
        let (tree, window, ..) = sample_tree();
        let only: Vec<NodeId> = tree
            .find_all(window, SearchScope::Element, &unconditional())
            .unwrap()
            .collect();
        assert_eq!(only, vec![window]);
    }

    #[test]
    fn test_removed_node_id_is_stale() {
        let (tree, _, submit, _) = sample_tree();
        tree.remove_node(submit).unwrap();
        let err = tree.property(submit, PropertyId::Name).unwrap_err();
        assert!(matches!(err, ProviderError::Stale { .. }));
    }

    #[test]
    fn test_remove_subtree_stales_descendants() {
        let (tree, window, submit, panel) = sample_tree();
        tree.remove_node(window).unwrap();
        for id in [window, submit, panel] {
            assert!(matches!(
                tree.property(id, PropertyId::Name),
                Err(ProviderError::Stale { .. })
            ));
        }
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let tree = SimTree::new();
        assert!(matches!(
            tree.remove_node(tree.root()),
            Err(ProviderError::Rejected { .. })
        ));
    }

    #[test]
    fn test_search_under_stale_root_fails() {
        let (tree, window, ..) = sample_tree();
        tree.remove_node(window).unwrap();
        let err = tree
            .find_first(window, SearchScope::Descendants, &unconditional())
            .unwrap_err();
        assert!(matches!(err, ProviderError::Stale { .. }));
    }

    #[test]
    fn test_capability_lookup_respects_support() {
        let (tree, window, submit, _) = sample_tree();
        assert!(tree
            .capability(submit, CapabilityId::Invoke)
            .unwrap()
            .is_some());
        assert!(tree
            .capability(window, CapabilityId::Invoke)
            .unwrap()
            .is_none());
        assert!(tree
            .capability(submit, CapabilityId::RangeValue)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_focus_tracking() {
        let (tree, _, submit, _) = sample_tree();
        assert_eq!(tree.focused().unwrap(), None);
        tree.set_focus(Some(submit)).unwrap();
        assert_eq!(tree.focused().unwrap(), Some(submit));
        tree.remove_node(submit).unwrap();
        assert_eq!(tree.focused().unwrap(), None);
    }

    #[test]
    fn test_node_at_picks_deepest_hit() {
        let tree = SimTree::new();
        let window = tree
            .add_node(
                tree.root(),
                NodeSpec {
                    name: Some("Window".into()),
                    bounds: Some(Rect {
                        x: 0.0,
                        y: 0.0,
                        width: 800.0,
                        height: 600.0,
                    }),
                    ..NodeSpec::default()
                },
            )
            .unwrap();
        let button = tree
            .add_node(
                window,
                NodeSpec {
                    name: Some("Ok".into()),
                    bounds: Some(Rect {
                        x: 100.0,
                        y: 100.0,
                        width: 50.0,
                        height: 20.0,
                    }),
                    ..NodeSpec::default()
                },
            )
            .unwrap();
        assert_eq!(tree.node_at(110.0, 105.0).unwrap(), Some(button));
        assert_eq!(tree.node_at(10.0, 10.0).unwrap(), Some(window));
        assert_eq!(tree.node_at(2000.0, 10.0).unwrap(), None);
    }

    #[test]
    fn test_is_enabled_property_reflects_state() {
        let (tree, _, submit, _) = sample_tree();
        assert_eq!(
            tree.property(submit, PropertyId::IsEnabled).unwrap(),
            Some(PropertyValue::Bool(true))
        );
        tree.set_enabled(submit, false).unwrap();
        assert_eq!(
            tree.property(submit, PropertyId::IsEnabled).unwrap(),
            Some(PropertyValue::Bool(false))
        );
    }
}
