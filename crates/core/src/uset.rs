//! Code point sets and the bracketed set-pattern parser behind
//! `[optimize [...]]` and `[suppressContractions [...]]`.

use serde::{Deserialize, Serialize};

use crate::grammar::scanner::is_white_space;

const MAX_CODE_POINT: u32 = 0x10FFFF;

/// A set of code points stored as sorted, disjoint, non-adjacent inclusive
/// ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodePointSet {
    ranges: Vec<(u32, u32)>,
}

impl CodePointSet {
    /// The empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Whether `c` is a member.
    pub fn contains(&self, c: char) -> bool {
        let cp = c as u32;
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if hi < cp {
                    std::cmp::Ordering::Less
                } else if lo > cp {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Member ranges in ascending order.
    pub fn ranges(&self) -> impl Iterator<Item = std::ops::RangeInclusive<u32>> + '_ {
        self.ranges.iter().map(|&(lo, hi)| lo..=hi)
    }

    /// Number of code points in the set.
    pub fn len(&self) -> usize {
        self.ranges
            .iter()
            .map(|&(lo, hi)| (hi - lo) as usize + 1)
            .sum()
    }

    /// Add a single code point.
    pub fn insert(&mut self, c: char) {
        self.insert_range(c as u32, c as u32);
    }

    /// Add every code point in `lo..=hi`. Empty when `lo > hi`.
    pub fn insert_range(&mut self, lo: u32, hi: u32) {
        let hi = hi.min(MAX_CODE_POINT);
        if lo > hi {
            return;
        }
        let mut merged = Vec::with_capacity(self.ranges.len() + 1);
        let mut pending = (lo, hi);
        let mut placed = false;
        for &(a, b) in &self.ranges {
            if placed {
                merged.push((a, b));
            } else if b.saturating_add(1) < pending.0 {
                merged.push((a, b));
            } else if pending.1.saturating_add(1) < a {
                merged.push(pending);
                merged.push((a, b));
                placed = true;
            } else {
                pending = (pending.0.min(a), pending.1.max(b));
            }
        }
        if !placed {
            merged.push(pending);
        }
        self.ranges = merged;
    }

    /// Add every member of `other`.
    pub fn add_all(&mut self, other: &CodePointSet) {
        for &(lo, hi) in &other.ranges {
            self.insert_range(lo, hi);
        }
    }

    /// All code points not in the set.
    pub fn complement(&self) -> CodePointSet {
        let mut ranges = Vec::with_capacity(self.ranges.len() + 1);
        let mut next = 0u32;
        for &(lo, hi) in &self.ranges {
            if lo > next {
                ranges.push((next, lo - 1));
            }
            next = hi + 1;
        }
        if next <= MAX_CODE_POINT {
            ranges.push((next, MAX_CODE_POINT));
        }
        CodePointSet { ranges }
    }

    /// Members of both sets.
    pub fn intersection(&self, other: &CodePointSet) -> CodePointSet {
        let mut union = self.complement();
        union.add_all(&other.complement());
        union.complement()
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &CodePointSet) -> CodePointSet {
        self.intersection(&other.complement())
    }
}

impl FromIterator<char> for CodePointSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut set = CodePointSet::new();
        for c in iter {
            set.insert(c);
        }
        set
    }
}

// ─── Set patterns ───────────────────────────────────────────────────────────

/// Why a set pattern was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SetPatternError {
    /// The pattern ends before its closing `]`.
    #[error("set pattern is not terminated")]
    Unterminated,
    /// A character appears where it is not allowed.
    #[error("unexpected {found:?} at position {at} of set pattern")]
    Unexpected {
        /// The offending character.
        found: char,
        /// Character index within the pattern.
        at: usize,
    },
    /// A backslash escape is malformed.
    #[error("invalid escape at position {at} of set pattern")]
    InvalidEscape {
        /// Character index of the backslash.
        at: usize,
    },
    /// A range's start lies after its end.
    #[error("inverted range at position {at} of set pattern")]
    InvertedRange {
        /// Character index of the range dash.
        at: usize,
    },
    /// Syntax this parser does not implement.
    #[error("{0} are not supported by this set pattern parser")]
    Unsupported(&'static str),
}

/// Turns a bracketed set pattern such as `[a-zà]` into a set.
pub trait SetPatternParser {
    /// Parse `pattern`, which starts with `[` and ends with its matching `]`.
    fn parse_set(&self, pattern: &str) -> Result<CodePointSet, SetPatternError>;
}

/// [`SetPatternParser`] for literal set syntax.
///
/// Supports `^` negation, characters and `a-z` ranges, quoted text, escapes
/// (`\uXXXX`, `\UXXXXXXXX`, `\xXX`, `\x{X...}`, `\t`, `\n`, `\r`, and any
/// other escaped character as itself), nested sets (union), `&[...]`
/// intersection and `-[...]` difference. Whitespace is ignored. Property
/// expressions and multi-character strings are rejected as unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleSetParser;

impl SetPatternParser for SimpleSetParser {
    fn parse_set(&self, pattern: &str) -> Result<CodePointSet, SetPatternError> {
        let mut p = SetScanner {
            chars: pattern.chars().collect(),
            pos: 0,
        };
        p.skip_ws();
        let set = p.bracketed()?;
        p.skip_ws();
        if let Some(&found) = p.chars.get(p.pos) {
            return Err(SetPatternError::Unexpected { found, at: p.pos });
        }
        Ok(set)
    }
}

enum SetOp {
    Intersect,
    Subtract,
}

struct SetScanner {
    chars: Vec<char>,
    pos: usize,
}

impl SetScanner {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(is_white_space) {
            self.pos += 1;
        }
    }

    /// Next non-whitespace character after `pos + 1`, without consuming.
    fn peek_after_ws(&self) -> Option<char> {
        self.chars[self.pos + 1..]
            .iter()
            .copied()
            .find(|&c| !is_white_space(c))
    }

    fn bracketed(&mut self) -> Result<CodePointSet, SetPatternError> {
        match self.peek() {
            Some('[') => self.pos += 1,
            Some(found) => return Err(SetPatternError::Unexpected { found, at: self.pos }),
            None => return Err(SetPatternError::Unterminated),
        }
        if self.peek() == Some(':') {
            return Err(SetPatternError::Unsupported("property expressions"));
        }
        let negate = self.peek() == Some('^');
        if negate {
            self.pos += 1;
        }
        let mut set = CodePointSet::new();
        let mut op: Option<SetOp> = None;
        let mut last: Option<char> = None;
        loop {
            self.skip_ws();
            let Some(c) = self.peek() else {
                return Err(SetPatternError::Unterminated);
            };
            match c {
                ']' => {
                    self.pos += 1;
                    break;
                }
                '[' => {
                    let inner = self.bracketed()?;
                    set = match op.take() {
                        None => {
                            set.add_all(&inner);
                            set
                        }
                        Some(SetOp::Intersect) => set.intersection(&inner),
                        Some(SetOp::Subtract) => set.difference(&inner),
                    };
                    last = None;
                }
                '&' if self.peek_after_ws() == Some('[') => {
                    self.pos += 1;
                    op = Some(SetOp::Intersect);
                }
                '-' if self.peek_after_ws() == Some('[') => {
                    self.pos += 1;
                    op = Some(SetOp::Subtract);
                }
                '-' if last.is_some() && self.peek_after_ws() != Some(']') => {
                    let at = self.pos;
                    self.pos += 1;
                    self.skip_ws();
                    let end = self.range_end()?;
                    let start = last.take().map_or(0, |s| s as u32);
                    if (end as u32) < start {
                        return Err(SetPatternError::InvertedRange { at });
                    }
                    set.insert_range(start, end as u32);
                }
                '{' => return Err(SetPatternError::Unsupported("string elements")),
                '\'' => {
                    self.pos += 1;
                    last = self.quoted(&mut set)?;
                }
                _ => {
                    let ch = self.single()?;
                    set.insert(ch);
                    last = Some(ch);
                }
            }
        }
        Ok(if negate { set.complement() } else { set })
    }

    /// Quoted text after the opening apostrophe; `''` is an apostrophe.
    /// Returns the last character when exactly one was quoted, so it can
    /// start a range.
    fn quoted(&mut self, set: &mut CodePointSet) -> Result<Option<char>, SetPatternError> {
        if self.peek() == Some('\'') {
            self.pos += 1;
            set.insert('\'');
            return Ok(Some('\''));
        }
        let mut count = 0usize;
        let mut last = None;
        loop {
            let Some(c) = self.peek() else {
                return Err(SetPatternError::Unterminated);
            };
            self.pos += 1;
            if c == '\'' {
                if self.peek() == Some('\'') {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            set.insert(c);
            last = Some(c);
            count += 1;
        }
        Ok(if count == 1 { last } else { None })
    }

    /// The character after a range dash, possibly quoted.
    fn range_end(&mut self) -> Result<char, SetPatternError> {
        let at = self.pos;
        if self.peek() != Some('\'') {
            return self.single();
        }
        self.pos += 1;
        let mut scratch = CodePointSet::new();
        self.quoted(&mut scratch)?
            .ok_or(SetPatternError::Unexpected { found: '\'', at })
    }

    /// One literal or escaped character.
    fn single(&mut self) -> Result<char, SetPatternError> {
        let at = self.pos;
        let Some(c) = self.peek() else {
            return Err(SetPatternError::Unterminated);
        };
        self.pos += 1;
        match c {
            '\\' => self.escape(at),
            '[' | ']' | '{' | '}' | '&' => Err(SetPatternError::Unexpected { found: c, at }),
            _ => Ok(c),
        }
    }

    fn escape(&mut self, at: usize) -> Result<char, SetPatternError> {
        let Some(c) = self.peek() else {
            return Err(SetPatternError::InvalidEscape { at });
        };
        self.pos += 1;
        match c {
            'u' => self.hex_digits(4, 4, at),
            'U' => self.hex_digits(8, 8, at),
            'x' if self.peek() == Some('{') => {
                self.pos += 1;
                let ch = self.hex_digits(1, 6, at)?;
                if self.peek() != Some('}') {
                    return Err(SetPatternError::InvalidEscape { at });
                }
                self.pos += 1;
                Ok(ch)
            }
            'x' => self.hex_digits(2, 2, at),
            'p' | 'P' | 'N' => Err(SetPatternError::Unsupported("property expressions")),
            't' => Ok('\t'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            other => Ok(other),
        }
    }

    fn hex_digits(&mut self, min: usize, max: usize, at: usize) -> Result<char, SetPatternError> {
        let mut value = 0u32;
        let mut count = 0;
        while count < max {
            let Some(d) = self.peek().and_then(|c| c.to_digit(16)) else {
                break;
            };
            value = value * 16 + d;
            count += 1;
            self.pos += 1;
        }
        if count < min {
            return Err(SetPatternError::InvalidEscape { at });
        }
        char::from_u32(value).ok_or(SetPatternError::InvalidEscape { at })
    }
}
