//! Host-facing component metadata.

use std::fmt;

/// Identifier of a host-managed component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(&'static str);

impl ComponentId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Components that need others initialised before they can start.
///
/// Consumed by the host's start ordering; the component itself never reads it.
pub trait Dependent {
    fn dependencies(&self) -> &'static [ComponentId];
}
