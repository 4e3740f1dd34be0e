//! Convenience facades over capability resolution.
//!
//! Each facade resolves one capability through [`crate::capability::resolve`]
//! and forwards to the resolved accessor. The absent-capability case is
//! always handled explicitly (reported as [`PatternError::Unsupported`]),
//! never dereferenced blind.

pub mod invoke;
pub mod range_value;

pub use invoke::{click, invoke_pattern};
pub use range_value::{
    is_read_only, large_change, maximum, minimum, range_value_pattern, set_value, small_change,
    value,
};

use crate::capability::CapabilityId;
use crate::provider::{NodeId, ProviderError};

/// Failures surfaced by the facade layer.
#[derive(thiserror::Error, Debug, Clone)]
pub enum PatternError {
    /// The node does not support the capability the operation needs.
    ///
    /// Distinct from [`ProviderError::Stale`]: "control never supported this"
    /// is not "control disappeared".
    #[error("node {node} does not support {capability}")]
    Unsupported {
        node: NodeId,
        capability: CapabilityId,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
