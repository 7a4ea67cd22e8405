//! Level-of-Service grading from average control delay.
//!
//! Thresholds follow HCM 6th Edition.  Every bound is an *inclusive*
//! upper bound in seconds per vehicle:
//!
//! | LOS | Signalized | TWSC / AWSC |
//! |-----|------------|-------------|
//! | A   | ≤ 10       | ≤ 10        |
//! | B   | ≤ 20       | ≤ 15        |
//! | C   | ≤ 35       | ≤ 25        |
//! | D   | ≤ 55       | ≤ 35        |
//! | E   | ≤ 80       | ≤ 50        |
//! | F   | > 80       | > 50        |

use std::fmt;
use std::str::FromStr;

/// Intersection control type, constant per node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ControlType {
    Signalized,
    /// Two-way or all-way stop control.
    Twsc,
}

/// HCM letter grade.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Los {
    A,
    B,
    C,
    D,
    E,
    F,
}

const SIGNALIZED_BOUNDS: [f64; 5] = [10.0, 20.0, 35.0, 55.0, 80.0];
const STOP_CONTROL_BOUNDS: [f64; 5] = [10.0, 15.0, 25.0, 35.0, 50.0];
const GRADES: [Los; 6] = [Los::A, Los::B, Los::C, Los::D, Los::E, Los::F];

impl ControlType {
    /// Grade `delay`.  `None` when the delay is undefined (`NaN`).
    pub fn classify(self, delay: f64) -> Option<Los> {
        if delay.is_nan() {
            return None;
        }
        let bounds = match self {
            ControlType::Signalized => &SIGNALIZED_BOUNDS,
            ControlType::Twsc => &STOP_CONTROL_BOUNDS,
        };
        let idx = bounds.iter().position(|&b| delay <= b).unwrap_or(bounds.len());
        Some(GRADES[idx])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ControlType::Signalized => "signalized",
            ControlType::Twsc       => "twsc",
        }
    }
}

impl FromStr for ControlType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "signalized" => Ok(ControlType::Signalized),
            "twsc" | "awsc" => Ok(ControlType::Twsc),
            _ => Err(format!("unknown control type: {s}")),
        }
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Los {
    pub fn as_str(self) -> &'static str {
        match self {
            Los::A => "A",
            Los::B => "B",
            Los::C => "C",
            Los::D => "D",
            Los::E => "E",
            Los::F => "F",
        }
    }
}

impl fmt::Display for Los {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grade `delay` for a control type given as free text.
///
/// An unrecognized control type or an undefined delay yields `""`.
pub fn los(delay: f64, control_type: &str) -> &'static str {
    control_type
        .parse::<ControlType>()
        .ok()
        .and_then(|c| c.classify(delay))
        .map_or("", Los::as_str)
}
