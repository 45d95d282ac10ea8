//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Alerts, simulation events, and subscriber connections each carry a
//! strongly-typed ID so they cannot be mixed up at compile time. All IDs
//! use UUID v7 (time-ordered) so log lines sort naturally.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Identifier of one ingested (classified) hazard report.
    ///
    /// Delayed civilian alerts are keyed by this ID so they can be
    /// cancelled individually.
    AlertEventId
}

define_id! {
    /// Identifier of an event emitted by the tectonic simulation.
    HazardEventId
}

define_id! {
    /// Identifier of one subscriber connection within a tier group.
    SubscriberId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_time_ordered() {
        let a = AlertEventId::new();
        let b = AlertEventId::new();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = SubscriberId::from(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
