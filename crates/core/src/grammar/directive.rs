use serde::{Deserialize, Serialize};

use crate::uset::CodePointSet;

/// Comparison level at which two strings differ.
///
/// Relation operators produce `Primary`, `Secondary`, `Tertiary` or
/// `Identical`; `Quaternary` is only reachable through `[strength 4]`.
/// The derived ordering runs from strongest (`Primary`) to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// Base letters differ.
    Primary,
    /// Accents differ.
    Secondary,
    /// Case or variant forms differ.
    Tertiary,
    /// Distinguishes variable characters when they are shifted.
    Quaternary,
    /// Code point order breaks remaining ties.
    Identical,
}

/// Symbolic anchor for a reset, written in brackets: `&[last variable]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialPosition {
    /// `[first tertiary ignorable]`
    FirstTertiaryIgnorable,
    /// `[last tertiary ignorable]`
    LastTertiaryIgnorable,
    /// `[first secondary ignorable]`
    FirstSecondaryIgnorable,
    /// `[last secondary ignorable]`
    LastSecondaryIgnorable,
    /// `[first primary ignorable]`
    FirstPrimaryIgnorable,
    /// `[last primary ignorable]`
    LastPrimaryIgnorable,
    /// `[first variable]`
    FirstVariable,
    /// `[last variable]`, also spelled `[variable top]`
    LastVariable,
    /// `[first implicit]`
    FirstImplicit,
    /// `[last implicit]`
    LastImplicit,
    /// `[first regular]`
    FirstRegular,
    /// `[last regular]`, also spelled `[top]`
    LastRegular,
    /// `[first trailing]`
    FirstTrailing,
    /// `[last trailing]`
    LastTrailing,
}

impl SpecialPosition {
    /// Every position in rule-syntax order.
    pub const ALL: [SpecialPosition; 14] = [
        SpecialPosition::FirstTertiaryIgnorable,
        SpecialPosition::LastTertiaryIgnorable,
        SpecialPosition::FirstSecondaryIgnorable,
        SpecialPosition::LastSecondaryIgnorable,
        SpecialPosition::FirstPrimaryIgnorable,
        SpecialPosition::LastPrimaryIgnorable,
        SpecialPosition::FirstVariable,
        SpecialPosition::LastVariable,
        SpecialPosition::FirstImplicit,
        SpecialPosition::LastImplicit,
        SpecialPosition::FirstRegular,
        SpecialPosition::LastRegular,
        SpecialPosition::FirstTrailing,
        SpecialPosition::LastTrailing,
    ];

    /// Canonical spelling inside the brackets.
    pub fn name(self) -> &'static str {
        match self {
            SpecialPosition::FirstTertiaryIgnorable => "first tertiary ignorable",
            SpecialPosition::LastTertiaryIgnorable => "last tertiary ignorable",
            SpecialPosition::FirstSecondaryIgnorable => "first secondary ignorable",
            SpecialPosition::LastSecondaryIgnorable => "last secondary ignorable",
            SpecialPosition::FirstPrimaryIgnorable => "first primary ignorable",
            SpecialPosition::LastPrimaryIgnorable => "last primary ignorable",
            SpecialPosition::FirstVariable => "first variable",
            SpecialPosition::LastVariable => "last variable",
            SpecialPosition::FirstImplicit => "first implicit",
            SpecialPosition::LastImplicit => "last implicit",
            SpecialPosition::FirstRegular => "first regular",
            SpecialPosition::LastRegular => "last regular",
            SpecialPosition::FirstTrailing => "first trailing",
            SpecialPosition::LastTrailing => "last trailing",
        }
    }

    /// Look up a collapsed word run, accepting the `top` and `variable top`
    /// aliases.
    pub fn from_words(words: &str) -> Option<Self> {
        match words {
            "top" => Some(SpecialPosition::LastRegular),
            "variable top" => Some(SpecialPosition::LastVariable),
            _ => Self::ALL.into_iter().find(|p| p.name() == words),
        }
    }
}

/// Where a reset anchors the relations that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ResetPosition {
    /// An existing string, composed to its contiguous canonical form.
    Text(String),
    /// A symbolic boundary of the root order.
    Special(SpecialPosition),
}

/// A single tailoring edge.
///
/// `target` sorts at `strength` after the preceding anchor when it follows
/// `prefix`, and `extension` contributes trailing weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Difference level relative to the previous anchor.
    pub strength: Strength,
    /// Context that must precede `target`; empty when absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,
    /// The tailored string.
    pub target: String,
    /// Expansion appended to the weights of `target`; empty when absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extension: String,
}

/// One structured instruction for the collation builder, as recorded by
/// [`DirectiveLog`](crate::sink::DirectiveLog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Directive {
    /// Start of a rule chain.
    Reset {
        /// `Identical` unless the reset carried `[before n]`.
        strength: Strength,
        /// The anchor.
        position: ResetPosition,
    },
    /// A tailoring edge inside the current chain.
    Relation(Relation),
    /// `[suppressContractions [...]]`.
    SuppressContractions {
        /// Characters whose root contractions are suppressed.
        set: CodePointSet,
    },
}
