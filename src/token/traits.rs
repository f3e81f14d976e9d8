//! Traits for abstracting over token capabilities.

use crate::token::GhostToken;

/// A token that can authorize shared access to branded state.
///
/// Stream operations accept `&impl GhostBorrow<'brand>` rather than a concrete
/// token type, so wrappers that only forward shared access can participate.
pub trait GhostBorrow<'brand> {}

impl<'brand> GhostBorrow<'brand> for GhostToken<'brand> {}
