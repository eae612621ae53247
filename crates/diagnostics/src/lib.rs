//! Diagnostics for collation rule parsing.
//!
//! Provides [`ParseError`], [`ErrorCategory`] and the bounded context-window
//! helpers used to report the first failure of a rule parse. Diagnostic codes
//! are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Default size of the context buffers, including room for a terminator.
///
/// Each context window therefore holds at most `DEFAULT_CONTEXT_LEN - 1`
/// bytes of rule text.
pub const DEFAULT_CONTEXT_LEN: usize = 16;

// ── Context windows ─────────────────────────────────────────────────────

/// Return the smallest index >= `pos` that is a valid UTF-8 char boundary,
/// clamped to `s.len()`.
fn next_char_boundary(s: &str, pos: usize) -> usize {
    let mut p = pos.min(s.len());
    while p < s.len() && !s.is_char_boundary(p) {
        p += 1;
    }
    p
}

/// Return the largest index <= `pos` that is a valid UTF-8 char boundary.
fn prev_char_boundary(s: &str, pos: usize) -> usize {
    let mut p = pos.min(s.len());
    while p > 0 && !s.is_char_boundary(p) {
        p -= 1;
    }
    p
}

/// Text immediately before `offset`, at most `context_len - 1` bytes long.
///
/// The window never begins inside a multi-byte sequence; when the nominal
/// start would split a character the window is shortened instead.
pub fn pre_context(text: &str, offset: usize, context_len: usize) -> &str {
    let offset = next_char_boundary(text, offset);
    let start = offset.saturating_sub(context_len.saturating_sub(1));
    let start = next_char_boundary(text, start);
    &text[start..offset]
}

/// Text starting at `offset`, at most `context_len - 1` bytes long.
///
/// The window never ends inside a multi-byte sequence.
pub fn post_context(text: &str, offset: usize, context_len: usize) -> &str {
    let offset = next_char_boundary(text, offset);
    let end = offset
        .saturating_add(context_len.saturating_sub(1))
        .min(text.len());
    let end = prev_char_boundary(text, end);
    &text[offset..end]
}

// ── Categories ──────────────────────────────────────────────────────────

/// Broad class of a parse failure, derived from its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Malformed literal text: quotes, escapes, invalid code points.
    Lexical,
    /// Structure that does not match the rule grammar.
    Grammar,
    /// Well-formed input with an invalid meaning.
    Semantic,
    /// A collaborator (sink, importer, base data) refused the input.
    Delegated,
}

impl ErrorCategory {
    /// Category for a `COLLnxxx` code, or `None` for foreign codes.
    pub fn of(code: &str) -> Option<Self> {
        match code.strip_prefix("COLL")?.as_bytes().first()? {
            b'1' => Some(Self::Lexical),
            b'2' => Some(Self::Grammar),
            b'3' => Some(Self::Semantic),
            b'4' => Some(Self::Delegated),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Lexical => write!(f, "lexical"),
            ErrorCategory::Grammar => write!(f, "grammar"),
            ErrorCategory::Semantic => write!(f, "semantic"),
            ErrorCategory::Delegated => write!(f, "delegated"),
        }
    }
}

// ── ParseError ──────────────────────────────────────────────────────────

/// The first failure of a rule parse.
///
/// `offset` is a byte offset into the rule text the error is reported
/// against. Failures inside imported rules are re-anchored at the importing
/// `[import ...]` setting, and the tags they passed through are listed in
/// `imports`, outermost first. Line numbers are not tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("error[{code}]: {reason} at offset {offset}")]
pub struct ParseError {
    /// Diagnostic code (e.g., `"COLL2001"`).
    pub code: Cow<'static, str>,
    /// Human-readable reason.
    pub reason: Cow<'static, str>,
    /// Byte offset where the offending construct begins.
    pub offset: usize,
    /// Always 0; the rule text is treated as a single line.
    pub line: usize,
    /// Rule text just before `offset`.
    pub pre_context: String,
    /// Rule text starting at `offset`.
    pub post_context: String,
    /// Import tags leading to the failure, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    /// Machine-readable details for tooling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

impl ParseError {
    /// Create an error anchored at `offset` in `text`, copying out context
    /// windows of `context_len - 1` bytes on either side.
    pub fn new(
        code: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
        text: &str,
        offset: usize,
        context_len: usize,
    ) -> Self {
        let offset = next_char_boundary(text, offset);
        Self {
            code: code.into(),
            reason: reason.into(),
            offset,
            line: 0,
            pre_context: pre_context(text, offset, context_len).to_string(),
            post_context: post_context(text, offset, context_len).to_string(),
            imports: Vec::new(),
            details: None,
        }
    }

    /// Attach machine-readable details (builder pattern).
    pub fn with_details(mut self, details: BTreeMap<String, String>) -> Self {
        self.details = Some(details);
        self
    }

    /// Move an error raised inside imported rules to the importing setting.
    ///
    /// The offset and context windows are recomputed against `text`, and
    /// `import` is prepended to [`ParseError::imports`]. Code, reason and
    /// details are kept.
    pub fn reanchor(
        mut self,
        text: &str,
        offset: usize,
        context_len: usize,
        import: impl Into<String>,
    ) -> Self {
        let offset = next_char_boundary(text, offset);
        self.offset = offset;
        self.pre_context = pre_context(text, offset, context_len).to_string();
        self.post_context = post_context(text, offset, context_len).to_string();
        self.imports.insert(0, import.into());
        self
    }

    /// Category derived from the code, if it is one of ours.
    pub fn category(&self) -> Option<ErrorCategory> {
        ErrorCategory::of(&self.code)
    }

    /// Returns the human-readable explanation for this error's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.code)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    let text = match id {
        codes::UNTERMINATED_QUOTE => {
            "An apostrophe opened quoted literal text but no closing apostrophe follows. Use '' for a literal apostrophe."
        }
        codes::DANGLING_ESCAPE => {
            "A backslash escapes the following character, but the rule string ends right after it."
        }
        codes::UNPAIRED_SURROGATE => {
            "UTF-16 rule text contains a lead or trail surrogate without its partner."
        }
        codes::NONCHARACTER => "Tailoring strings may not contain the noncharacters U+FFFE or U+FFFF.",
        codes::MISSING_STRING => {
            "A reset, relation, prefix or extension needs a non-empty string; a syntax character or the end of input came first."
        }
        codes::UNEXPECTED_CHARACTER => {
            "At top level only whitespace, '&' (reset), '[' (setting), '#' (comment), '@' and '!' may appear."
        }
        codes::RESET_WITHOUT_POSITION => "A reset must be followed by a string or a bracketed special position.",
        codes::RESET_WITHOUT_RELATION => {
            "Each reset must be followed by at least one relation such as '<', '<<', '<<<', ';', ',' or '='."
        }
        codes::INVALID_SPECIAL_POSITION => {
            "Bracketed reset positions are names like [first tertiary ignorable], [last variable], [top] or [variable top]."
        }
        codes::EXPECTED_SETTING => "A '[' at top level must start a setting such as [strength 2] or [reorder Grek].",
        codes::INVALID_SETTING => "The option name or its value is not recognized.",
        codes::UNBALANCED_SET_BRACKETS => "The set pattern in [optimize [...]] or [suppressContractions [...]] has unbalanced brackets.",
        codes::INVALID_SET_PATTERN => "The set pattern could not be parsed.",
        codes::MISSING_SETTING_TERMINATOR => "A set pattern option must be closed with ']' after the pattern.",
        codes::STARRED_NOT_INERT => {
            "Starred relations (<*, <<*, <<<*, =*) list single code points that must be unaffected by canonical decomposition."
        }
        codes::RANGE_WITHOUT_START => "A '-' in a starred relation must follow a code point that starts the range.",
        codes::RANGE_WITHOUT_END => "A '-' in a starred relation must be followed by the code point that ends the range.",
        codes::RANGE_INVERTED => "A starred relation range must not start after it ends.",
        codes::BEFORE_STRENGTH_MISMATCH => {
            "After &[before n] the first relation must have strength n, e.g. &[before 2] << x."
        }
        codes::BEFORE_STRENGTH_STRONGER => {
            "After &[before n] no relation in the chain may be stronger than strength n."
        }
        codes::TAILORING_STRING_TOO_LONG => "A tailoring string may be at most 31 UTF-16 units long after canonical decomposition.",
        codes::UNSUPPORTED_OPTION => "The option value is recognized but not supported, e.g. [hiraganaQ on].",
        codes::INVALID_LANGUAGE_TAG => "[import] expects a BCP 47 language tag such as de, sr-Latn or de-u-co-phonebk.",
        codes::UNKNOWN_REORDER_CODE => {
            "[reorder] accepts script codes, space, punct, symbol, currency, digit, others and default."
        }
        codes::IMPORT_UNSUPPORTED => "[import] needs an importer to resolve the language tag to rules.",
        codes::IMPORT_CYCLE => "The imported rules import, directly or indirectly, a locale that is already being imported.",
        codes::IMPORT_TOO_DEEP => "[import] chains are limited to the configured maximum depth.",
        codes::REORDER_WITHOUT_BASE => "[reorder] with script codes needs base collation data to build the permutation table.",
        codes::SINK_REJECTED => "The collation builder refused a reset, relation or set.",
        codes::IMPORT_FAILED => "The importer could not provide rules for the requested locale.",
        codes::REORDER_TABLE_FAILED => "The base collation data could not build the reorder table.",
        _ => return None,
    };
    Some(text)
}
