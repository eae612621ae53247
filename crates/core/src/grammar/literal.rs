//! String literal decoding: quoting, escapes, range dashes and validation.

use coll_rules_diagnostics::codes;

use super::parser::Failure;
use super::scanner::{char_at, is_syntax_char, is_white_space, skip_white_space};
use crate::normalize::Normalizer;

/// Longest tailoring string, in UTF-16 units after canonical decomposition.
///
/// Limited by the builder's token string encoding.
pub(crate) const MAX_TAILORING_LEN: usize = 31;

/// Decode one literal starting at `start` (leading whitespace is skipped).
///
/// Returns the decoded text and the offset just past the literal. A
/// terminating syntax character is left unconsumed; terminating whitespace is
/// consumed. With `allow_dash` an unquoted `-` is kept as content instead of
/// ending the literal.
pub(crate) fn parse_string(
    rules: &str,
    start: usize,
    allow_dash: bool,
) -> Result<(String, usize), Failure> {
    let mut raw = String::new();
    let mut i = skip_white_space(rules, start);
    while let Some(c) = char_at(rules, i) {
        i += c.len_utf8();
        if is_syntax_char(c) {
            match c {
                '\'' => {
                    if char_at(rules, i) == Some('\'') {
                        // '' encodes a single apostrophe.
                        raw.push('\'');
                        i += 1;
                        continue;
                    }
                    loop {
                        let Some(q) = char_at(rules, i) else {
                            return Err(Failure::new(
                                codes::UNTERMINATED_QUOTE,
                                "quoted literal text missing terminating apostrophe",
                            ));
                        };
                        i += q.len_utf8();
                        if q == '\'' {
                            if char_at(rules, i) == Some('\'') {
                                i += 1;
                            } else {
                                break;
                            }
                        }
                        raw.push(q);
                    }
                }
                '\\' => {
                    let Some(escaped) = char_at(rules, i) else {
                        return Err(Failure::new(
                            codes::DANGLING_ESCAPE,
                            "backslash escape at the end of the rule string",
                        ));
                    };
                    raw.push(escaped);
                    i += escaped.len_utf8();
                }
                '-' if allow_dash => raw.push('-'),
                _ => {
                    i -= c.len_utf8();
                    break;
                }
            }
        } else if is_white_space(c) {
            i = skip_white_space(rules, i);
            break;
        } else {
            raw.push(c);
        }
    }
    if raw.is_empty() {
        return Err(Failure::new(codes::MISSING_STRING, "missing string"));
    }
    if raw.contains(['\u{FFFE}', '\u{FFFF}']) {
        return Err(Failure::new(
            codes::NONCHARACTER,
            "string contains U+FFFE or U+FFFF",
        ));
    }
    Ok((raw, i))
}

/// Decode a reset, relation, prefix or extension string and enforce the
/// decomposed length limit. The returned text is not normalized.
pub(crate) fn parse_tailoring_string(
    rules: &str,
    start: usize,
    normalizer: &dyn Normalizer,
) -> Result<(String, usize), Failure> {
    let (raw, end) = parse_string(rules, start, false)?;
    let nfd_len: usize = normalizer.nfd(&raw).chars().map(char::len_utf16).sum();
    if nfd_len > MAX_TAILORING_LEN {
        return Err(Failure::new(
            codes::TAILORING_STRING_TOO_LONG,
            "tailoring string too long",
        ));
    }
    Ok((raw, end))
}
