//! Strongly typed identifier wrappers for simulator objects.
//!
//! VISSIM numbers nodes, links and travel-time segments independently, so
//! each gets its own type.  All ids are `Copy + Ord + Hash` and display as
//! the bare number, which is how they appear in report tables.

use std::fmt;

/// Generate a typed id wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(serde::Serialize, serde::Deserialize)]
        $vis struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(n: $inner) -> $name {
                $name(n)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;
            fn from_str(s: &str) -> Result<$name, Self::Err> {
                s.trim().parse::<$inner>().map($name)
            }
        }
    };
}

typed_id! {
    /// VISSIM node number (an intersection evaluated by node evaluation).
    pub struct NodeNo(u32);
}

typed_id! {
    /// VISSIM link number.
    pub struct LinkNo(u32);
}

typed_id! {
    /// VISSIM vehicle travel-time measurement number.
    pub struct SegmentNo(u32);
}
