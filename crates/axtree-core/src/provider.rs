//! The platform accessibility service, abstracted behind a trait.
//!
//! The tree itself is owned by the operating system and its accessibility
//! providers; this layer only queries it and invokes capability operations on
//! it. Every call is a direct, blocking round-trip with no internal locking,
//! queueing, or retry.

use crate::capability::{CapabilityHandle, CapabilityId};
use crate::condition::CompositeCondition;
use crate::property::{PropertyId, PropertyValue};
use crate::search::SearchScope;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle addressing one element of a provider's tree.
///
/// A handle is a read-only lookup key into externally-owned state. Validity
/// is not guaranteed across tree changes; a dead handle surfaces as
/// [`ProviderError::Stale`] rather than as an absent result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failures surfaced by a tree provider.
///
/// "No match" and "capability unsupported" are expected outcomes and are
/// represented as `Ok(None)` by the calls that produce them, never as one of
/// these variants.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ProviderError {
    #[error("node {id} is stale (no longer in the tree)")]
    Stale { id: NodeId },

    #[error("node {id} is disabled")]
    Disabled { id: NodeId },

    #[error("value of node {id} is read-only")]
    ReadOnly { id: NodeId },

    #[error("operation rejected on node {id}: {reason}")]
    Rejected { id: NodeId, reason: String },

    #[error("capability mismatch on node {id}: requested {requested}, provider returned {returned}")]
    CapabilityMismatch {
        id: NodeId,
        requested: CapabilityId,
        returned: CapabilityId,
    },

    #[error("provider failure: {0}")]
    Provider(String),
}

impl ProviderError {
    /// Stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ProviderError::Stale { .. } => "NODE_STALE",
            ProviderError::Disabled { .. } => "NODE_DISABLED",
            ProviderError::ReadOnly { .. } => "VALUE_READ_ONLY",
            ProviderError::Rejected { .. } => "OPERATION_REJECTED",
            ProviderError::CapabilityMismatch { .. } => "CAPABILITY_MISMATCH",
            ProviderError::Provider(_) => "PROVIDER_ERROR",
        }
    }

    /// Recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ProviderError::Stale { .. } => "Re-run the search to obtain a fresh handle",
            ProviderError::Disabled { .. } => "Wait for the control to become enabled",
            ProviderError::ReadOnly { .. } => "Check is_read_only before setting a value",
            ProviderError::Rejected { .. } => "Check the control's current state",
            ProviderError::CapabilityMismatch { .. } => {
                "Verify the provider honors the capability contract"
            }
            ProviderError::Provider(_) => "Check the accessibility service",
        }
    }
}

/// The accessibility tree service all searches and capability lookups run
/// against.
///
/// Implementations evaluate composite predicates against their live tree and
/// hand out [`NodeId`]s in their own document order; this layer does not
/// redefine ordering. Calls block until the service answers; callers needing
/// timeouts wrap calls externally.
pub trait TreeProvider {
    /// Root of the automation hierarchy (the desktop).
    fn desktop(&self) -> Result<NodeId, ProviderError>;

    /// Node currently holding input focus, if any.
    fn focused(&self) -> Result<Option<NodeId>, ProviderError>;

    /// Deepest node whose bounds contain the given desktop coordinate.
    fn node_at(&self, x: f64, y: f64) -> Result<Option<NodeId>, ProviderError>;

    /// Read one property of a node. `Ok(None)` means the node does not carry
    /// the property; a dead handle is `Err(Stale)`.
    fn property(
        &self,
        node: NodeId,
        id: PropertyId,
    ) -> Result<Option<PropertyValue>, ProviderError>;

    /// First node under `root` within `scope` satisfying `condition`, in
    /// provider order. `Ok(None)` when nothing matches.
    fn find_first(
        &self,
        root: NodeId,
        scope: SearchScope,
        condition: &CompositeCondition,
    ) -> Result<Option<NodeId>, ProviderError>;

    /// All nodes under `root` within `scope` satisfying `condition`, as a
    /// finite one-shot sequence in provider order. The sequence reflects the
    /// tree at evaluation time; a fresh call runs a fresh query.
    fn find_all<'a>(
        &'a self,
        root: NodeId,
        scope: SearchScope,
        condition: &CompositeCondition,
    ) -> Result<Box<dyn Iterator<Item = NodeId> + 'a>, ProviderError>;

    /// Look up a capability on a node. `Ok(None)` means the node does not
    /// currently support it; a dead handle is `Err(Stale)`, never `Ok(None)`.
    fn capability(
        &self,
        node: NodeId,
        id: CapabilityId,
    ) -> Result<Option<CapabilityHandle>, ProviderError>;
}
