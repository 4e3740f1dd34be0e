//! Capability identifiers and the generic resolution primitive.
//!
//! A capability is an optional, named interaction contract a node may
//! support. Support is determined per node at lookup time and can change as
//! control state changes (a provider may implement it conditionally), so
//! resolution results are never cached.

use crate::provider::{NodeId, ProviderError, TreeProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Identifier of an interaction capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityId {
    /// The control has a single, unambiguous action.
    Invoke,
    /// The control holds a numeric value within a bounded range.
    RangeValue,
}

impl CapabilityId {
    /// Canonical programmatic name of the capability.
    pub fn programmatic_name(&self) -> &'static str {
        match self {
            CapabilityId::Invoke => "InvokePattern",
            CapabilityId::RangeValue => "RangeValuePattern",
        }
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.programmatic_name())
    }
}

/// Activation of a control's single, unambiguous action.
pub trait InvokeCapability: fmt::Debug {
    /// Fires the action. Invoking a disabled control is rejected with
    /// [`ProviderError::Disabled`].
    fn invoke(&self) -> Result<(), ProviderError>;
}

/// A bounded numeric value on a control.
///
/// All accessors read the node's live state at call time; a handle resolved
/// before a value change observes the new value afterwards.
pub trait RangeValueCapability {
    fn value(&self) -> Result<f64, ProviderError>;

    /// Sets the value. Rejected with [`ProviderError::ReadOnly`] when the
    /// value cannot be modified, and with [`ProviderError::Rejected`] when
    /// the value lies outside the control's range.
    fn set_value(&self, value: f64) -> Result<(), ProviderError>;

    fn minimum(&self) -> Result<f64, ProviderError>;

    fn maximum(&self) -> Result<f64, ProviderError>;

    /// Control-specific small increment (e.g. one arrow-key step).
    fn small_change(&self) -> Result<f64, ProviderError>;

    /// Control-specific large increment (e.g. one page step).
    fn large_change(&self) -> Result<f64, ProviderError>;

    fn is_read_only(&self) -> Result<bool, ProviderError>;
}

/// Tagged capability object handed out by a provider lookup.
pub enum CapabilityHandle {
    Invoke(Box<dyn InvokeCapability>),
    RangeValue(Box<dyn RangeValueCapability>),
}

impl CapabilityHandle {
    pub fn id(&self) -> CapabilityId {
        match self {
            CapabilityHandle::Invoke(_) => CapabilityId::Invoke,
            CapabilityHandle::RangeValue(_) => CapabilityId::RangeValue,
        }
    }
}

impl fmt::Debug for CapabilityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapabilityHandle({})", self.id())
    }
}

/// A strongly-typed view over a [`CapabilityHandle`].
///
/// Implemented by the boxed accessor types; [`resolve`] uses it to narrow the
/// tagged handle a provider returns to the capability the caller asked for.
pub trait Capability: Sized {
    const ID: CapabilityId;

    fn from_handle(handle: CapabilityHandle) -> Option<Self>;
}

impl Capability for Box<dyn InvokeCapability> {
    const ID: CapabilityId = CapabilityId::Invoke;

    fn from_handle(handle: CapabilityHandle) -> Option<Self> {
        match handle {
            CapabilityHandle::Invoke(capability) => Some(capability),
            _ => None,
        }
    }
}

impl Capability for Box<dyn RangeValueCapability> {
    const ID: CapabilityId = CapabilityId::RangeValue;

    fn from_handle(handle: CapabilityHandle) -> Option<Self> {
        match handle {
            CapabilityHandle::RangeValue(capability) => Some(capability),
            _ => None,
        }
    }
}

/// Look up a strongly-typed capability on a node.
///
/// This is the single primitive every pattern facade is built on. The three
/// outcomes are kept distinct:
///
/// - `Ok(Some(p))`: the node currently supports the capability;
/// - `Ok(None)`: the node does not support it (expected, not a failure);
/// - `Err(_)`: the node handle is stale or the provider failed. Callers must
///   not conflate this with "unsupported".
///
/// Every call re-queries the node's current capability set.
pub fn resolve<P: Capability>(
    provider: &dyn TreeProvider,
    node: NodeId,
) -> Result<Option<P>, ProviderError> {
    trace!(node = %node, capability = %P::ID, "resolving capability");
    match provider.capability(node, P::ID)? {
        Some(handle) => {
            let returned = handle.id();
            match P::from_handle(handle) {
                Some(capability) => Ok(Some(capability)),
                // The provider answered with a different capability than the
                // id it was asked for; surface the contract violation.
                None => Err(ProviderError::CapabilityMismatch {
                    id: node,
                    requested: P::ID,
                    returned,
                }),
            }
        }
        None => Ok(None),
    }
}
