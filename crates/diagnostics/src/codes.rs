//! Diagnostic ID constants.
//!
//! The first digit after the `COLL` prefix selects the [`ErrorCategory`]:
//! `1` lexical, `2` grammar, `3` semantic, `4` delegated.
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete.
//!
//! [`ErrorCategory`]: crate::ErrorCategory

// ── Lexical ─────────────────────────────────────────────────────────────

/// Quoted literal text is missing its terminating apostrophe.
pub const UNTERMINATED_QUOTE: &str = "COLL1001";

/// A backslash escape is the last character of the rule string.
pub const DANGLING_ESCAPE: &str = "COLL1002";

/// The rule text contains an unpaired surrogate.
pub const UNPAIRED_SURROGATE: &str = "COLL1003";

/// A literal contains U+FFFE or U+FFFF.
pub const NONCHARACTER: &str = "COLL1004";

/// A string literal was expected but nothing was collected.
pub const MISSING_STRING: &str = "COLL1005";

// ── Grammar ─────────────────────────────────────────────────────────────

/// A top-level character is not a reset, setting, comment or flag.
pub const UNEXPECTED_CHARACTER: &str = "COLL2001";

/// `&` (optionally followed by `[before n]`) reaches the end of input.
pub const RESET_WITHOUT_POSITION: &str = "COLL2002";

/// A reset is not followed by any relation.
pub const RESET_WITHOUT_RELATION: &str = "COLL2003";

/// A bracketed reset position is not one of the known names.
pub const INVALID_SPECIAL_POSITION: &str = "COLL2004";

/// `[` at top level is not followed by an option name.
pub const EXPECTED_SETTING: &str = "COLL2005";

/// The option head and value do not form a known setting.
pub const INVALID_SETTING: &str = "COLL2006";

/// An embedded set pattern has unbalanced brackets.
pub const UNBALANCED_SET_BRACKETS: &str = "COLL2007";

/// An embedded set pattern was rejected by the set pattern parser.
pub const INVALID_SET_PATTERN: &str = "COLL2008";

/// An option with a set pattern is missing its closing `]`.
pub const MISSING_SETTING_TERMINATOR: &str = "COLL2009";

// ── Semantic ────────────────────────────────────────────────────────────

/// A starred relation contains a character that is not NFD-inert.
pub const STARRED_NOT_INERT: &str = "COLL3001";

/// A range dash in a starred relation has no start character.
pub const RANGE_WITHOUT_START: &str = "COLL3002";

/// A range dash in a starred relation has no end character.
pub const RANGE_WITHOUT_END: &str = "COLL3003";

/// A starred relation range starts after it ends.
pub const RANGE_INVERTED: &str = "COLL3004";

/// The first relation after `[before n]` does not have strength n.
pub const BEFORE_STRENGTH_MISMATCH: &str = "COLL3005";

/// A relation after `[before n]` is stronger than strength n.
pub const BEFORE_STRENGTH_STRONGER: &str = "COLL3006";

/// A tailoring string exceeds 31 UTF-16 units after decomposition.
pub const TAILORING_STRING_TOO_LONG: &str = "COLL3007";

/// An option value is recognized but not supported.
pub const UNSUPPORTED_OPTION: &str = "COLL3008";

/// The `[import]` value is not a well-formed language tag.
pub const INVALID_LANGUAGE_TAG: &str = "COLL3009";

/// A `[reorder]` word is neither a special group nor a known script.
pub const UNKNOWN_REORDER_CODE: &str = "COLL3010";

/// `[import]` was used without an importer.
pub const IMPORT_UNSUPPORTED: &str = "COLL3011";

/// `[import]` re-entered a locale that is already being imported.
pub const IMPORT_CYCLE: &str = "COLL3012";

/// `[import]` nesting exceeds the configured maximum depth.
pub const IMPORT_TOO_DEEP: &str = "COLL3013";

/// `[reorder]` names a script but no base collation data is available.
pub const REORDER_WITHOUT_BASE: &str = "COLL3014";

// ── Delegated ───────────────────────────────────────────────────────────

/// The directive sink refused a reset, relation or set.
pub const SINK_REJECTED: &str = "COLL4001";

/// The importer could not provide rules for a locale.
pub const IMPORT_FAILED: &str = "COLL4002";

/// The base data could not build a reorder permutation table.
pub const REORDER_TABLE_FAILED: &str = "COLL4003";
