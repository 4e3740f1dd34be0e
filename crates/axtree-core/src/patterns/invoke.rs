//! Invoke facade: fire a control's single, unambiguous action.

use crate::capability::{resolve, CapabilityId, InvokeCapability};
use crate::patterns::PatternError;
use crate::provider::{NodeId, ProviderError, TreeProvider};

/// Resolve the invoke capability on a node.
///
/// `Ok(None)` when the node cannot be invoked.
pub fn invoke_pattern(
    provider: &dyn TreeProvider,
    node: NodeId,
) -> Result<Option<Box<dyn InvokeCapability>>, ProviderError> {
    resolve(provider, node)
}

/// Activate the node's action.
///
/// Reports [`PatternError::Unsupported`] when the node has no invoke
/// capability; a disabled control is rejected by the provider with
/// [`ProviderError::Disabled`].
pub fn click(provider: &dyn TreeProvider, node: NodeId) -> Result<(), PatternError> {
    let pattern = invoke_pattern(provider, node)?.ok_or(PatternError::Unsupported {
        node,
        capability: CapabilityId::Invoke,
    })?;
    pattern.invoke().map_err(PatternError::from)
}
