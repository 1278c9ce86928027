//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct use as a slot index, but callers should prefer the `.index()`
//! helpers for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — equivalent to the type's MAX.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a slot index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }
    };
}

typed_id! {
    /// Handle of a simulated crowd agent.  Owned by `mg-crowd`; every other
    /// crate holds the id as a weak reference and must tolerate the agent
    /// having been removed.
    pub struct AgentId(u32);
}

typed_id! {
    /// Identity of a tour target (a picture frame / exhibit).  Resolved to
    /// world anchors through the exhibit catalog.
    pub struct ExhibitId(u32);
}

typed_id! {
    /// Index of a sample point on the navigable surface graph.
    pub struct NodeId(u32);
}

typed_id! {
    /// Opaque back-reference to a visual scene entity (a loaded character
    /// model).  The core never dereferences or destroys it; the rendering
    /// layer owns the mapping to actual scene nodes.
    pub struct EntityId(u64);
}
