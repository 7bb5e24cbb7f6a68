//! Type-safe identifier wrappers.
//!
//! Rosters are referenced across stores by a UUID v7 so a save slot can
//! point at a roster blob written independently of it. Entities that live
//! inside a single game (legislators, events, promises, programmes) use
//! sequential `u32` identifiers: they must be reproducible from the game
//! seed, which rules out time-ordered UUIDs.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_uuid_id {
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
    };
}

/// Generates a newtype wrapper around a sequential `u32`.
macro_rules! define_seq_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u32);

        impl $name {
            /// Return the raw sequence number.
            pub const fn get(self) -> u32 {
                self.0
            }

            /// Return the identifier that follows this one.
            pub const fn next(self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

define_uuid_id! {
    /// Stable identifier of a legislator roster stored outside the save slot.
    RosterId
}

define_seq_id! {
    /// Identifier of a legislator within a roster.
    LegislatorId
}

define_seq_id! {
    /// Identifier of a raised event awaiting a response.
    EventId
}

define_seq_id! {
    /// Identifier of a promise made to one or more legislators.
    PromiseId
}

define_seq_id! {
    /// Identifier of an emergency spending programme.
    ProgrammeId
}
