//! Range-value facade: read and set a control's bounded numeric value.

use crate::capability::{resolve, CapabilityId, RangeValueCapability};
use crate::patterns::PatternError;
use crate::provider::{NodeId, ProviderError, TreeProvider};

/// Resolve the range-value capability on a node.
///
/// `Ok(None)` when the node holds no bounded value. Presence is independent
/// of enablement: a disabled slider still resolves.
pub fn range_value_pattern(
    provider: &dyn TreeProvider,
    node: NodeId,
) -> Result<Option<Box<dyn RangeValueCapability>>, ProviderError> {
    resolve(provider, node)
}

fn with_pattern<T>(
    provider: &dyn TreeProvider,
    node: NodeId,
    op: impl FnOnce(&dyn RangeValueCapability) -> Result<T, ProviderError>,
) -> Result<T, PatternError> {
    let pattern = range_value_pattern(provider, node)?.ok_or(PatternError::Unsupported {
        node,
        capability: CapabilityId::RangeValue,
    })?;
    op(pattern.as_ref()).map_err(PatternError::from)
}

/// Current value of the node.
pub fn value(provider: &dyn TreeProvider, node: NodeId) -> Result<f64, PatternError> {
    with_pattern(provider, node, |p| p.value())
}

/// Set the node's value.
///
/// Rejected with [`ProviderError::ReadOnly`] on a read-only value and with
/// [`ProviderError::Rejected`] when `value` lies outside the node's range.
pub fn set_value(provider: &dyn TreeProvider, node: NodeId, value: f64) -> Result<(), PatternError> {
    with_pattern(provider, node, |p| p.set_value(value))
}

/// Minimum value the node supports.
pub fn minimum(provider: &dyn TreeProvider, node: NodeId) -> Result<f64, PatternError> {
    with_pattern(provider, node, |p| p.minimum())
}

/// Maximum value the node supports.
pub fn maximum(provider: &dyn TreeProvider, node: NodeId) -> Result<f64, PatternError> {
    with_pattern(provider, node, |p| p.maximum())
}

/// Control-specific small-change step.
pub fn small_change(provider: &dyn TreeProvider, node: NodeId) -> Result<f64, PatternError> {
    with_pattern(provider, node, |p| p.small_change())
}

/// Control-specific large-change step.
pub fn large_change(provider: &dyn TreeProvider, node: NodeId) -> Result<f64, PatternError> {
    with_pattern(provider, node, |p| p.large_change())
}

/// Whether the node's value is read-only.
///
/// Resolved through the same checked path as every other accessor; an
/// unsupported node reports [`PatternError::Unsupported`] instead of
/// faulting.
pub fn is_read_only(provider: &dyn TreeProvider, node: NodeId) -> Result<bool, PatternError> {
    with_pattern(provider, node, |p| p.is_read_only())
}
