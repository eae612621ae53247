//! Character classes and low-level cursor helpers shared by the rule parser.
//!
//! All positions are byte offsets into the rule text and always sit on char
//! boundaries. Helpers never read past the end; an offset equal to the text
//! length means "exhausted".

/// Unicode Pattern_White_Space.
pub(crate) fn is_white_space(c: char) -> bool {
    matches!(
        c,
        '\t'..='\r' | ' ' | '\u{85}' | '\u{200E}' | '\u{200F}' | '\u{2028}' | '\u{2029}'
    )
}

/// ASCII punctuation and symbols, which have syntactic meaning in rules
/// unless quoted or escaped.
pub(crate) fn is_syntax_char(c: char) -> bool {
    matches!(
        c,
        '\u{21}'..='\u{2F}' | '\u{3A}'..='\u{40}' | '\u{5B}'..='\u{60}' | '\u{7B}'..='\u{7E}'
    )
}

/// Character starting at `i`, if any.
pub(crate) fn char_at(text: &str, i: usize) -> Option<char> {
    text.get(i..).and_then(|rest| rest.chars().next())
}

/// Advance past any whitespace starting at `i`.
pub(crate) fn skip_white_space(text: &str, mut i: usize) -> usize {
    while let Some(c) = char_at(text, i) {
        if !is_white_space(c) {
            break;
        }
        i += c.len_utf8();
    }
    i
}

/// Advance past the end of the current line.
///
/// Stops after LF, FF, CR, NEL, LS or PS. A CR LF pair leaves the LF
/// unconsumed; it is skipped later as whitespace.
pub(crate) fn skip_comment(text: &str, mut i: usize) -> usize {
    while let Some(c) = char_at(text, i) {
        i += c.len_utf8();
        if matches!(c, '\n' | '\u{0C}' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}') {
            break;
        }
    }
    i
}

/// Collect a run of option words starting at `i`.
///
/// Leading whitespace is skipped, inner whitespace runs collapse to a single
/// space, and a trailing space is dropped. The run ends before the first
/// syntax character other than `-` and `_`, whose offset is returned along
/// with the words. Returns `None` when the text ends before such a
/// terminator.
pub(crate) fn read_words(text: &str, i: usize) -> Option<(usize, String)> {
    let mut words = String::new();
    let mut i = skip_white_space(text, i);
    loop {
        let c = char_at(text, i)?;
        if is_syntax_char(c) && c != '-' && c != '_' {
            if words.ends_with(' ') {
                words.pop();
            }
            return Some((i, words));
        }
        if is_white_space(c) {
            words.push(' ');
            i = skip_white_space(text, i + c.len_utf8());
        } else {
            words.push(c);
            i += c.len_utf8();
        }
    }
}
