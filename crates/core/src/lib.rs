//! Collation tailoring rule parser.
//!
//! Turns a rule string such as `&a < b << c [strength 2]` into a stream of
//! reset and relation directives for a collation builder, and applies
//! bracketed settings to a [`CollationSettings`] value. The main entry
//! point is [`RuleParser::parse`]; [`DirectiveLog`] records what a parse
//! produced and [`to_pretty_json`] dumps it.

#![warn(missing_docs)]

/// Rule grammar: scanner, literals, chains, settings and directive types.
pub mod grammar;
/// Normalization services used on tailoring strings.
pub mod normalize;
/// Parser tunables.
pub mod options;
/// Collation settings written by rule options.
pub mod settings;
/// Collaborator traits and the recording sink.
pub mod sink;
/// Code point sets and set pattern parsing.
pub mod uset;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Parser
pub use grammar::parser::RuleParser;
pub use options::ParserOptions;

// Directives
pub use grammar::directive::{Directive, Relation, ResetPosition, SpecialPosition, Strength};

// Settings
pub use settings::{
    AlternateHandling, CaseFirst, CollationSettings, ReorderCode, Reordering, SettingsFlags,
};

// Collaborators
pub use normalize::{Normalizer, UnicodeNormalizer};
pub use sink::{BaseData, DirectiveLog, Importer, Rejected, Sink};
pub use uset::{CodePointSet, SetPatternError, SetPatternParser, SimpleSetParser};

// Diagnostics (re-exported from the diagnostics crate)
pub use coll_rules_diagnostics::{ErrorCategory, ParseError, codes};

// Serialization helpers
pub use grammar::dump::to_pretty_json;
