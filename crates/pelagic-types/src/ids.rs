//! Type-safe identifier wrappers around plain integers.
//!
//! Every entity in the simulation has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. IDs are monotonic
//! integers allocated by the owning registry (devices by their manager,
//! species by the global biology, cells by the ocean grid), so they double
//! as stable arena indices for side tables.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an integer with standard derives.
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
            /// Wrap a raw identifier value.
            pub const fn new(raw: $inner) -> Self {
                Self(raw)
            }

            /// Return the inner integer value.
            pub const fn into_inner(self) -> $inner {
                self.0
            }

            /// Return the identifier as a `usize` index into per-entity
            /// arrays. Saturates at `usize::MAX` on narrow targets.
            pub fn index(self) -> usize {
                usize::try_from(self.0).unwrap_or(usize::MAX)
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
    };
}

define_id! {
    /// Unique identifier for a deployed FAD (fish aggregation device).
    ///
    /// Allocated monotonically by the owning [`FadManager`]; never reused
    /// within a run, so side tables keyed by `FadId` cannot alias a
    /// removed device.
    ///
    /// [`FadManager`]: https://docs.rs/pelagic-fads
    FadId(u64)
}

define_id! {
    /// Stable index of a species in the global biology registry.
    SpeciesId(u32)
}

define_id! {
    /// Unique identifier for a fishing vessel (one FAD manager each).
    VesselId(u32)
}

define_id! {
    /// Flat index of an ocean cell in the spatial grid.
    CellId(u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let fad = FadId::new(7);
        let species = SpeciesId::new(7);
        // Different types -- the compiler enforces no mixing.
        assert_eq!(fad.into_inner(), 7);
        assert_eq!(species.into_inner(), 7);
    }

    #[test]
    fn id_index_matches_inner() {
        let species = SpeciesId::new(3);
        assert_eq!(species.index(), 3);
    }

    #[test]
    fn id_display_is_plain_integer() {
        assert_eq!(FadId::new(42).to_string(), "42");
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = FadId::new(99);
        let json = serde_json::to_string(&original).ok();
        assert_eq!(json.as_deref(), Some("99"));
        let restored: Result<FadId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn ids_order_by_value() {
        assert!(FadId::new(1) < FadId::new(2));
    }
}
