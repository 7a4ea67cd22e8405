//! Raise-or-warn policy for data-quality problems in analyst inputs.

use serde::Deserialize;

/// How the pipeline reacts to problems that the analyst is expected to fix
/// in the mapping spreadsheets (unmapped directions, zero-volume groups,
/// unknown control types, column-name collisions).
///
/// Structural invariant violations (duplicate directions after
/// de-duplication, unparseable movement labels, missing files) always halt
/// regardless of this setting.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Log a warning and carry on.
    #[default]
    Lenient,
    /// Return an error.
    Strict,
}

impl Strictness {
    #[inline]
    pub fn is_strict(self) -> bool {
        matches!(self, Strictness::Strict)
    }
}
