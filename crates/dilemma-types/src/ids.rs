//! Type-safe identifier wrappers around small integers.
//!
//! Agents are identified by their construction-time slot index, so every
//! identifier is a plain number on the wire. The newtypes exist to keep
//! agent ids and proposal ids from being mixed at compile time.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an unsigned integer with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Wrap a raw numeric identifier.
            pub const fn new(raw: $inner) -> Self {
                Self(raw)
            }

            /// Return the inner numeric value.
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(raw: $inner) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of an agent: its slot index in the world roster.
    AgentId(u32)
}

define_id! {
    /// Identifier of a governance proposal, allocated from a strictly
    /// increasing counter.
    ProposalId(u64)
}
