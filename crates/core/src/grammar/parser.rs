use std::borrow::Cow;

use coll_rules_diagnostics::{ParseError, codes};
use log::trace;

use super::directive::{ResetPosition, SpecialPosition, Strength};
use super::literal::{parse_string, parse_tailoring_string};
use super::scanner::{char_at, is_white_space, read_words, skip_comment, skip_white_space};
use crate::normalize::{Normalizer, UnicodeNormalizer};
use crate::options::ParserOptions;
use crate::settings::{CollationSettings, SettingsFlags};
use crate::sink::{BaseData, Importer, Rejected, Sink};
use crate::uset::{CodePointSet, SetPatternParser, SimpleSetParser};

/// Shorthand for building a `BTreeMap<String, String>` of error details.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}
pub(super) use ctx;

/// An error found by a helper that does not know where the current
/// construct starts. The frame positions it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Failure {
    pub(crate) code: &'static str,
    pub(crate) reason: Cow<'static, str>,
}

impl Failure {
    pub(crate) fn new(code: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Parser for collation tailoring rules.
///
/// Holds the collaborators and the accumulated `[optimize [...]]` set. One
/// parser may be used for several rule strings in turn; it is not meant to
/// be shared between threads while parsing.
///
/// ```
/// use coll_rules_core::{CollationSettings, DirectiveLog, RuleParser};
///
/// let mut log = DirectiveLog::new();
/// let mut settings = CollationSettings::default();
/// RuleParser::new()
///     .parse("&a < b << c", &mut log, &mut settings)
///     .unwrap();
/// assert_eq!(log.len(), 3);
/// ```
pub struct RuleParser<'a> {
    pub(super) base: Option<&'a dyn BaseData>,
    pub(super) normalizer: &'a dyn Normalizer,
    pub(super) sets: &'a dyn SetPatternParser,
    pub(super) importer: Option<&'a mut dyn Importer>,
    pub(super) options: ParserOptions,
    pub(super) optimize_set: CodePointSet,
}

impl Default for RuleParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RuleParser<'a> {
    /// A parser with the built-in normalizer and set pattern parser, no
    /// base data and no importer.
    pub fn new() -> Self {
        Self {
            base: None,
            normalizer: &UnicodeNormalizer,
            sets: &SimpleSetParser,
            importer: None,
            options: ParserOptions::default(),
            optimize_set: CodePointSet::new(),
        }
    }

    /// Use `base` for script names and reorder tables.
    pub fn with_base(mut self, base: &'a dyn BaseData) -> Self {
        self.base = Some(base);
        self
    }

    /// Resolve `[import ...]` through `importer`.
    pub fn with_importer(mut self, importer: &'a mut dyn Importer) -> Self {
        self.importer = Some(importer);
        self
    }

    /// Replace the normalizer.
    pub fn with_normalizer(mut self, normalizer: &'a dyn Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Replace the set pattern parser used by `[optimize]` and
    /// `[suppressContractions]`.
    pub fn with_set_parser(mut self, sets: &'a dyn SetPatternParser) -> Self {
        self.sets = sets;
        self
    }

    /// Replace the options.
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Characters named by `[optimize [...]]` in every rule string parsed
    /// so far.
    pub fn optimize_set(&self) -> &CodePointSet {
        &self.optimize_set
    }

    /// Parse `rules`, sending directives to `sink` and applying settings to
    /// `settings`.
    ///
    /// Stops at the first error. Whatever reached `sink` and `settings`
    /// before it stays there; callers discard both on failure.
    pub fn parse<S: Sink + ?Sized>(
        &mut self,
        rules: &str,
        sink: &mut S,
        settings: &mut CollationSettings,
    ) -> Result<(), ParseError> {
        let mut imports = Vec::new();
        Frame {
            parser: self,
            sink,
            settings,
            rules,
            rule_index: 0,
            imports: &mut imports,
        }
        .run()
    }

    /// Parse rules held as UTF-16.
    ///
    /// An unpaired surrogate fails before anything is parsed; its offset is
    /// where the surrogate would sit in the decoded text.
    pub fn parse_utf16<S: Sink + ?Sized>(
        &mut self,
        rules: &[u16],
        sink: &mut S,
        settings: &mut CollationSettings,
    ) -> Result<(), ParseError> {
        let mut decoded = String::with_capacity(rules.len());
        for unit in char::decode_utf16(rules.iter().copied()) {
            match unit {
                Ok(c) => decoded.push(c),
                Err(e) => {
                    let offset = decoded.len();
                    let lossy = String::from_utf16_lossy(rules);
                    return Err(ParseError::new(
                        codes::UNPAIRED_SURROGATE,
                        "string contains an unpaired surrogate",
                        &lossy,
                        offset,
                        self.options.context_len,
                    )
                    .with_details(ctx!("unit" => format!("{:04X}", e.unpaired_surrogate()))));
                }
            }
        }
        self.parse(&decoded, sink, settings)
    }
}

// ─── Parse frame ────────────────────────────────────────────────────────────

/// State for walking one rule string. Imports walk their text in a nested
/// frame that borrows the same parser, sink and settings.
pub(super) struct Frame<'f, 'a, S: Sink + ?Sized> {
    pub(super) parser: &'f mut RuleParser<'a>,
    pub(super) sink: &'f mut S,
    pub(super) settings: &'f mut CollationSettings,
    pub(super) rules: &'f str,
    /// Start of the construct being parsed; errors are reported here.
    pub(super) rule_index: usize,
    /// Tags of the imports being parsed, outermost first.
    pub(super) imports: &'f mut Vec<String>,
}

/// A scanned relation operator.
struct Operator {
    strength: Strength,
    starred: bool,
    len: usize,
}

impl<S: Sink + ?Sized> Frame<'_, '_, S> {
    pub(super) fn fail(
        &self,
        code: &'static str,
        reason: impl Into<Cow<'static, str>>,
    ) -> ParseError {
        ParseError::new(
            code,
            reason,
            self.rules,
            self.rule_index,
            self.parser.options.context_len,
        )
    }

    pub(super) fn lift(&self, failure: Failure) -> ParseError {
        self.fail(failure.code, failure.reason)
    }

    pub(super) fn rejected(&self, code: &'static str, rejected: Rejected) -> ParseError {
        self.fail(code, rejected.reason)
    }

    // ── Main loop ───────────────────────────────────────────────────────

    pub(super) fn run(&mut self) -> Result<(), ParseError> {
        while let Some(c) = char_at(self.rules, self.rule_index) {
            if is_white_space(c) {
                self.rule_index += c.len_utf8();
                continue;
            }
            match c {
                '&' => self.parse_rule_chain()?,
                '[' => self.parse_setting()?,
                '#' => self.rule_index = skip_comment(self.rules, self.rule_index + 1),
                '@' => {
                    self.settings
                        .set_flag(SettingsFlags::BACKWARD_SECONDARY, true);
                    self.rule_index += 1;
                }
                // Legacy Thai/Lao reversal; the root order already covers it.
                '!' => self.rule_index += 1,
                _ => {
                    return Err(self
                        .fail(
                            codes::UNEXPECTED_CHARACTER,
                            "expected a reset or setting or comment",
                        )
                        .with_details(ctx!("found" => c.to_string())));
                }
            }
        }
        Ok(())
    }

    // ── Rule chains ─────────────────────────────────────────────────────

    fn parse_rule_chain(&mut self) -> Result<(), ParseError> {
        let reset_strength = self.parse_reset_and_position()?;
        let mut first = true;
        loop {
            let Some(op) = self.parse_relation_operator() else {
                if char_at(self.rules, self.rule_index) == Some('#') {
                    let end = skip_comment(self.rules, self.rule_index + 1);
                    self.rule_index = skip_white_space(self.rules, end);
                    continue;
                }
                if first {
                    return Err(self.fail(
                        codes::RESET_WITHOUT_RELATION,
                        "reset not followed by a relation",
                    ));
                }
                return Ok(());
            };
            if reset_strength < Strength::Identical {
                if first && op.strength != reset_strength {
                    return Err(self
                        .fail(
                            codes::BEFORE_STRENGTH_MISMATCH,
                            "reset-before strength differs from its first relation",
                        )
                        .with_details(strength_ctx(reset_strength, op.strength)));
                }
                if !first && op.strength < reset_strength {
                    return Err(self
                        .fail(
                            codes::BEFORE_STRENGTH_STRONGER,
                            "reset-before strength followed by a stronger relation",
                        )
                        .with_details(strength_ctx(reset_strength, op.strength)));
                }
            }
            let start = self.rule_index + op.len;
            if op.starred {
                self.parse_starred_characters(op.strength, start)?;
            } else {
                self.parse_relation_strings(op.strength, start)?;
            }
            first = false;
        }
    }

    /// Parse `&`, an optional `[before n]` and the reset position, and hand
    /// the reset to the sink. Returns the reset strength.
    fn parse_reset_and_position(&mut self) -> Result<Strength, ParseError> {
        let mut i = skip_white_space(self.rules, self.rule_index + 1);
        let strength = match before_strength(self.rules, i) {
            Some((strength, next)) => {
                i = next;
                strength
            }
            None => Strength::Identical,
        };
        if i >= self.rules.len() {
            return Err(self.fail(codes::RESET_WITHOUT_POSITION, "reset without position"));
        }
        let (position, end) = if char_at(self.rules, i) == Some('[') {
            let (special, end) = self.parse_special_position(i)?;
            (ResetPosition::Special(special), end)
        } else {
            let (raw, end) = parse_tailoring_string(self.rules, i, self.parser.normalizer)
                .map_err(|f| self.lift(f))?;
            (ResetPosition::Text(self.parser.normalizer.fcc(&raw)), end)
        };
        trace!("reset {strength:?} at {position:?}");
        self.sink
            .add_reset(strength, &position)
            .map_err(|e| self.rejected(codes::SINK_REJECTED, e))?;
        self.rule_index = end;
        Ok(strength)
    }

    /// `i` is at the `[`. Returns the position and the offset past `]`.
    fn parse_special_position(&self, i: usize) -> Result<(SpecialPosition, usize), ParseError> {
        if let Some((j, words)) = read_words(self.rules, i + 1) {
            if char_at(self.rules, j) == Some(']') && !words.is_empty() {
                if let Some(pos) = SpecialPosition::from_words(&words) {
                    return Ok((pos, j + 1));
                }
                return Err(self
                    .fail(
                        codes::INVALID_SPECIAL_POSITION,
                        "not a valid special reset position",
                    )
                    .with_details(ctx!("position" => words)));
            }
        }
        Err(self.fail(
            codes::INVALID_SPECIAL_POSITION,
            "not a valid special reset position",
        ))
    }

    /// Skip whitespace and scan a relation operator at the cursor. The
    /// cursor is left on the operator (or whatever ended the chain).
    fn parse_relation_operator(&mut self) -> Option<Operator> {
        self.rule_index = skip_white_space(self.rules, self.rule_index);
        let rest = self.rules.get(self.rule_index..)?;
        let (strength, mut len, can_star) = if rest.starts_with("<<<") {
            (Strength::Tertiary, 3, true)
        } else if rest.starts_with("<<") {
            (Strength::Secondary, 2, true)
        } else if rest.starts_with('<') {
            (Strength::Primary, 1, true)
        } else if rest.starts_with(';') {
            (Strength::Secondary, 1, false)
        } else if rest.starts_with(',') {
            (Strength::Tertiary, 1, false)
        } else if rest.starts_with('=') {
            (Strength::Identical, 1, true)
        } else {
            return None;
        };
        let starred = can_star && rest[len..].starts_with('*');
        if starred {
            len += 1;
        }
        Some(Operator {
            strength,
            starred,
            len,
        })
    }

    /// Parse `prefix | target / extension`, where prefix and extension are
    /// optional, and hand the relation to the sink.
    fn parse_relation_strings(&mut self, strength: Strength, i: usize) -> Result<(), ParseError> {
        let normalizer = self.parser.normalizer;
        let (raw, mut i) =
            parse_tailoring_string(self.rules, i, normalizer).map_err(|f| self.lift(f))?;
        let mut prefix = String::new();
        let target = if char_at(self.rules, i) == Some('|') {
            prefix = normalizer.fcc(&raw);
            let (raw, next) =
                parse_tailoring_string(self.rules, i + 1, normalizer).map_err(|f| self.lift(f))?;
            i = next;
            normalizer.fcc(&raw)
        } else {
            normalizer.fcc(&raw)
        };
        let mut extension = String::new();
        if char_at(self.rules, i) == Some('/') {
            let (raw, next) =
                parse_tailoring_string(self.rules, i + 1, normalizer).map_err(|f| self.lift(f))?;
            i = next;
            extension = normalizer.fcc(&raw);
        }
        trace!("relation {strength:?} {prefix:?}|{target:?}/{extension:?}");
        self.sink
            .add_relation(strength, &prefix, &target, &extension)
            .map_err(|e| self.rejected(codes::SINK_REJECTED, e))?;
        self.rule_index = i;
        Ok(())
    }

    /// Expand a starred relation such as `<*a-dxy` into one relation per
    /// code point.
    fn parse_starred_characters(&mut self, strength: Strength, i: usize) -> Result<(), ParseError> {
        let (raw, end) = parse_string(self.rules, i, true).map_err(|f| self.lift(f))?;
        let mut prev: Option<char> = None;
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '-' {
                self.add_starred(strength, c)?;
                prev = Some(c);
                continue;
            }
            let Some(first) = prev.take() else {
                return Err(self.fail(
                    codes::RANGE_WITHOUT_START,
                    "range without start in starred-relation string",
                ));
            };
            let Some(last) = chars.next() else {
                return Err(self.fail(
                    codes::RANGE_WITHOUT_END,
                    "range without end in starred-relation string",
                ));
            };
            self.check_inert(last)?;
            if last < first {
                return Err(self
                    .fail(
                        codes::RANGE_INVERTED,
                        "range start greater than end in starred-relation string",
                    )
                    .with_details(ctx!(
                        "start" => format!("U+{:04X}", u32::from(first)),
                        "end" => format!("U+{:04X}", u32::from(last)),
                    )));
            }
            // `first` was already added; surrogate code points have no char.
            for c in (u32::from(first) + 1..=u32::from(last)).filter_map(char::from_u32) {
                self.add_starred(strength, c)?;
            }
        }
        self.rule_index = end;
        Ok(())
    }

    fn check_inert(&self, c: char) -> Result<(), ParseError> {
        if self.parser.normalizer.is_nfd_inert(c) {
            Ok(())
        } else {
            Err(self
                .fail(
                    codes::STARRED_NOT_INERT,
                    "starred-relation string is not all NFD-inert",
                )
                .with_details(ctx!("char" => format!("U+{:04X}", u32::from(c)))))
        }
    }

    fn add_starred(&mut self, strength: Strength, c: char) -> Result<(), ParseError> {
        self.check_inert(c)?;
        let mut buf = [0u8; 4];
        let target: &str = c.encode_utf8(&mut buf);
        trace!("relation {strength:?} {target:?} (starred)");
        self.sink
            .add_relation(strength, "", target, "")
            .map_err(|e| self.rejected(codes::SINK_REJECTED, e))
    }
}

/// Match `[before n]` at `i`, with whitespace after `before` and optionally
/// before the digit. Returns the strength and the offset past the closing
/// bracket and any following whitespace.
fn before_strength(rules: &str, i: usize) -> Option<(Strength, usize)> {
    let rest = rules.get(i..)?.strip_prefix("[before")?;
    let gap = rest.chars().next().filter(|&c| is_white_space(c))?;
    let j = skip_white_space(rules, rules.len() - rest.len() + gap.len_utf8());
    let strength = match char_at(rules, j)? {
        '1' => Strength::Primary,
        '2' => Strength::Secondary,
        '3' => Strength::Tertiary,
        _ => return None,
    };
    (char_at(rules, j + 1)? == ']').then(|| (strength, skip_white_space(rules, j + 2)))
}

fn strength_ctx(
    required: Strength,
    found: Strength,
) -> std::collections::BTreeMap<String, String> {
    ctx!(
        "required" => format!("{required:?}").to_lowercase(),
        "found" => format!("{found:?}").to_lowercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn before_strength_forms() {
        assert_eq!(before_strength("[before 2]a", 0), Some((Strength::Secondary, 10)));
        assert_eq!(before_strength("[before  1] a", 0), Some((Strength::Primary, 12)));
        assert_eq!(before_strength("&[before 3]", 1), Some((Strength::Tertiary, 11)));
    }

    #[test]
    fn before_strength_rejects_malformed() {
        assert_eq!(before_strength("[before2]", 0), None);
        assert_eq!(before_strength("[before 4]", 0), None);
        assert_eq!(before_strength("[before 1 ]", 0), None);
        assert_eq!(before_strength("[before 1", 0), None);
        assert_eq!(before_strength("[first variable]", 0), None);
    }

    #[test]
    fn failure_keeps_code_and_reason() {
        let f = Failure::new(codes::MISSING_STRING, "missing string");
        assert_eq!(f.code, "COLL1005");
        assert_eq!(f.reason, "missing string");
    }
}
