//! Collation settings written by bracketed rule options.
//!
//! The parser mutates a caller-owned [`CollationSettings`] in place, so
//! imported rules and the importing rules accumulate into one value. The
//! builder reads it once `parse` has returned successfully.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::grammar::directive::Strength;

bitflags! {
    /// Boolean collation options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SettingsFlags: u8 {
        /// Compare secondary weights from the end of the string
        /// (`[backwards 2]` or `@`).
        const BACKWARD_SECONDARY = 1 << 0;
        /// Insert a case level between secondary and tertiary (`[caseLevel on]`).
        const CASE_LEVEL = 1 << 1;
        /// Check input for FCD and normalize if needed (`[normalization on]`).
        const CHECK_FCD = 1 << 2;
        /// Sort digit sequences by numeric value (`[numericOrdering on]`).
        const NUMERIC = 1 << 3;
    }
}

/// Treatment of variable characters such as spaces and punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlternateHandling {
    /// Variable characters have ordinary primary weights.
    #[default]
    NonIgnorable,
    /// Variable characters are ignored below the quaternary level.
    Shifted,
}

/// Which case sorts first at the tertiary level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFirst {
    /// No case preference beyond the root order.
    #[default]
    Off,
    /// Lowercase before uppercase.
    Lower,
    /// Uppercase before lowercase.
    Upper,
}

/// A script or special group in a `[reorder ...]` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderCode {
    /// `default`: fall back to the root order.
    Default,
    /// `space`
    Space,
    /// `punct`
    Punctuation,
    /// `symbol`
    Symbol,
    /// `currency`
    Currency,
    /// `digit`
    Digit,
    /// A script, by its numeric script property value.
    Script(u16),
}

impl ReorderCode {
    /// First value of the special group codes.
    pub const FIRST_SPECIAL: i32 = 0x1000;
    /// Script value of the Unknown script (`Zzzz`), also spelled `others`.
    pub const UNKNOWN_SCRIPT: u16 = 103;
    /// `others`: every script not listed explicitly.
    pub const OTHERS: ReorderCode = ReorderCode::Script(Self::UNKNOWN_SCRIPT);

    /// Numeric value as used by collation data tables.
    pub fn value(self) -> i32 {
        match self {
            ReorderCode::Default => -1,
            ReorderCode::Space => Self::FIRST_SPECIAL,
            ReorderCode::Punctuation => Self::FIRST_SPECIAL + 1,
            ReorderCode::Symbol => Self::FIRST_SPECIAL + 2,
            ReorderCode::Currency => Self::FIRST_SPECIAL + 3,
            ReorderCode::Digit => Self::FIRST_SPECIAL + 4,
            ReorderCode::Script(s) => i32::from(s),
        }
    }

    /// Match one of the special group names, ignoring ASCII case.
    pub fn special(word: &str) -> Option<Self> {
        [
            ("space", ReorderCode::Space),
            ("punct", ReorderCode::Punctuation),
            ("symbol", ReorderCode::Symbol),
            ("currency", ReorderCode::Currency),
            ("digit", ReorderCode::Digit),
        ]
        .into_iter()
        .find_map(|(name, code)| word.eq_ignore_ascii_case(name).then_some(code))
    }
}

/// A reorder list together with its lead-byte permutation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reordering {
    codes: Vec<ReorderCode>,
    table: Box<[u8; 256]>,
}

impl Reordering {
    /// Pair a code list with the table built for it.
    pub fn new(codes: Vec<ReorderCode>, table: Box<[u8; 256]>) -> Self {
        Self { codes, table }
    }

    /// The reorder codes in rule order.
    pub fn codes(&self) -> &[ReorderCode] {
        &self.codes
    }

    /// Maps each primary lead byte to its reordered lead byte.
    pub fn table(&self) -> &[u8; 256] {
        &self.table
    }
}

/// Collation attributes a rule string can set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CollationSettings {
    /// Number of levels compared.
    pub strength: Strength,
    /// Variable character handling.
    pub alternate: AlternateHandling,
    /// Tertiary case preference.
    pub case_first: CaseFirst,
    /// Boolean options.
    pub flags: SettingsFlags,
    reordering: Option<Reordering>,
}

impl Default for CollationSettings {
    fn default() -> Self {
        Self {
            strength: Strength::Tertiary,
            alternate: AlternateHandling::NonIgnorable,
            case_first: CaseFirst::Off,
            flags: SettingsFlags::empty(),
            reordering: None,
        }
    }
}

impl CollationSettings {
    /// Set the comparison strength.
    pub fn set_strength(&mut self, strength: Strength) {
        self.strength = strength;
    }

    /// Set the alternate handling mode.
    pub fn set_alternate_handling(&mut self, alternate: AlternateHandling) {
        self.alternate = alternate;
    }

    /// Set the case-first mode.
    pub fn set_case_first(&mut self, case_first: CaseFirst) {
        self.case_first = case_first;
    }

    /// Turn a boolean option on or off.
    pub fn set_flag(&mut self, flag: SettingsFlags, on: bool) {
        self.flags.set(flag, on);
    }

    /// Whether a boolean option is on.
    pub fn has_flag(&self, flag: SettingsFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Replace the reorder list and table wholesale; `None` restores the
    /// root order.
    pub fn set_reordering(&mut self, reordering: Option<Reordering>) {
        self.reordering = reordering;
    }

    /// Current reorder list and table, if any.
    pub fn reordering(&self) -> Option<&Reordering> {
        self.reordering.as_ref()
    }

    /// Current reorder codes; empty when there is no reordering.
    pub fn reorder_codes(&self) -> &[ReorderCode] {
        self.reordering.as_ref().map_or(&[], |r| r.codes())
    }

    /// Current permutation table, if any.
    pub fn reorder_table(&self) -> Option<&[u8; 256]> {
        self.reordering.as_ref().map(|r| r.table())
    }
}
