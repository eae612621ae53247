//! Bracketed settings: `[strength 2]`, `[reorder Grek]`, `[import de]`,
//! `[optimize [...]]` and friends.

use coll_rules_diagnostics::{ParseError, codes};
use log::debug;
use unic_langid::LanguageIdentifier;

use super::directive::Strength;
use super::parser::{Frame, ctx};
use super::scanner::{char_at, read_words, skip_white_space};
use crate::settings::{AlternateHandling, CaseFirst, ReorderCode, Reordering, SettingsFlags};
use crate::sink::{Rejected, Sink};

/// Collation type used when an import tag has no `-u-co-` keyword.
const STANDARD_TYPE: &str = "standard";

impl<S: Sink + ?Sized> Frame<'_, '_, S> {
    /// Parse a setting starting at the `[` under the cursor.
    pub(super) fn parse_setting(&mut self) -> Result<(), ParseError> {
        let (j, head) = match read_words(self.rules, self.rule_index + 1) {
            Some((j, head)) if !head.is_empty() => (j, head),
            _ => {
                return Err(self.fail(codes::EXPECTED_SETTING, "expected a setting/option at '['"));
            }
        };
        let applied = match char_at(self.rules, j) {
            Some(']') => self.apply_option(&head, j + 1)?,
            Some('[') => self.apply_set_option(&head, j)?,
            _ => false,
        };
        if applied {
            Ok(())
        } else {
            Err(self
                .fail(codes::INVALID_SETTING, "not a valid setting/option")
                .with_details(ctx!("option" => head)))
        }
    }

    /// Apply a `[name value]` option whose `]` ends just before `end`.
    /// Returns false for names or values that are not recognized.
    fn apply_option(&mut self, head: &str, end: usize) -> Result<bool, ParseError> {
        if let Some(names) = head.strip_prefix("reorder") {
            if names.is_empty() || names.starts_with(' ') {
                self.parse_reordering(names.trim_start())?;
                self.rule_index = end;
                return Ok(true);
            }
        }
        if head == "backwards 2" {
            self.settings
                .set_flag(SettingsFlags::BACKWARD_SECONDARY, true);
            self.rule_index = end;
            return Ok(true);
        }
        let (name, value) = head.rsplit_once(' ').unwrap_or((head, ""));
        let applied = match name {
            "strength" => match strength_value(value) {
                Some(strength) => {
                    self.settings.set_strength(strength);
                    true
                }
                None => false,
            },
            "alternate" => {
                let alternate = match value {
                    "non-ignorable" => Some(AlternateHandling::NonIgnorable),
                    "shifted" => Some(AlternateHandling::Shifted),
                    _ => None,
                };
                alternate
                    .map(|a| self.settings.set_alternate_handling(a))
                    .is_some()
            }
            "caseFirst" => {
                let case_first = match value {
                    "off" => Some(CaseFirst::Off),
                    "lower" => Some(CaseFirst::Lower),
                    "upper" => Some(CaseFirst::Upper),
                    _ => None,
                };
                case_first.map(|c| self.settings.set_case_first(c)).is_some()
            }
            "caseLevel" => self.set_on_off(SettingsFlags::CASE_LEVEL, value),
            "normalization" => self.set_on_off(SettingsFlags::CHECK_FCD, value),
            "numericOrdering" => self.set_on_off(SettingsFlags::NUMERIC, value),
            "hiraganaQ" => match on_off(value) {
                Some(true) => {
                    return Err(self
                        .fail(codes::UNSUPPORTED_OPTION, "[hiraganaQ on] is not supported"));
                }
                Some(false) => true,
                None => false,
            },
            "import" => {
                self.parse_import(value)?;
                true
            }
            _ => false,
        };
        if applied {
            self.rule_index = end;
        }
        Ok(applied)
    }

    fn set_on_off(&mut self, flag: SettingsFlags, value: &str) -> bool {
        match on_off(value) {
            Some(on) => {
                self.settings.set_flag(flag, on);
                true
            }
            None => false,
        }
    }

    /// Handle `[optimize [set]]` and `[suppressContractions [set]]`. `open`
    /// is the offset of the pattern's `[`.
    fn apply_set_option(&mut self, head: &str, open: usize) -> Result<bool, ParseError> {
        if head != "optimize" && head != "suppressContractions" {
            return Ok(false);
        }
        let pattern_end = self.scan_set_pattern(open)?;
        let rules = self.rules;
        let pattern = &rules[open..pattern_end];
        let set = self.parser.sets.parse_set(pattern).map_err(|e| {
            self.fail(codes::INVALID_SET_PATTERN, "not a valid UnicodeSet pattern")
                .with_details(ctx!("pattern" => pattern, "cause" => e.to_string()))
        })?;
        let close = skip_white_space(self.rules, pattern_end);
        if char_at(self.rules, close) != Some(']') {
            return Err(self.fail(
                codes::MISSING_SETTING_TERMINATOR,
                "missing option-terminating ']' after UnicodeSet pattern",
            ));
        }
        if head == "optimize" {
            debug!("optimize {} code points", set.len());
            self.parser.optimize_set.add_all(&set);
        } else {
            debug!("suppress contractions for {} code points", set.len());
            self.sink
                .suppress_contractions(&set)
                .map_err(|e| self.rejected(codes::SINK_REJECTED, e))?;
        }
        self.rule_index = close + 1;
        Ok(true)
    }

    /// Find the end of the bracketed pattern opening at `open` by counting
    /// `[` and `]`. A backslash hides the next character from the count.
    fn scan_set_pattern(&self, open: usize) -> Result<usize, ParseError> {
        let mut level = 0usize;
        let mut chars = self.rules[open..].char_indices();
        while let Some((k, c)) = chars.next() {
            match c {
                '[' => level += 1,
                ']' => {
                    level -= 1;
                    if level == 0 {
                        return Ok(open + k + 1);
                    }
                }
                '\\' => {
                    chars.next();
                }
                _ => {}
            }
        }
        Err(self.fail(
            codes::UNBALANCED_SET_BRACKETS,
            "unbalanced UnicodeSet pattern brackets",
        ))
    }

    /// Replace the reorder list with the space-separated `names`.
    fn parse_reordering(&mut self, names: &str) -> Result<(), ParseError> {
        self.settings.set_reordering(None);
        if names.is_empty() {
            debug!("reordering cleared");
            return Ok(());
        }
        let mut reorder = Vec::new();
        for name in names.split(' ') {
            let code = self.reorder_code(name)?;
            reorder.push(code);
        }
        if reorder == [ReorderCode::Default] {
            debug!("reordering reset to root");
            return Ok(());
        }
        let Some(base) = self.parser.base else {
            return Err(self.fail(
                codes::REORDER_WITHOUT_BASE,
                "[reorder ...] requires base collation data",
            ));
        };
        let values: Vec<i32> = reorder.iter().map(|c| c.value()).collect();
        let mut table = Box::new([0u8; 256]);
        base.make_reorder_table(&values, &mut table)
            .map_err(|e| self.rejected(codes::REORDER_TABLE_FAILED, e))?;
        debug!("reordering {values:?}");
        self.settings
            .set_reordering(Some(Reordering::new(reorder, table)));
        Ok(())
    }

    fn reorder_code(&self, name: &str) -> Result<ReorderCode, ParseError> {
        if let Some(code) = ReorderCode::special(name) {
            return Ok(code);
        }
        if let Some(script) = self.parser.base.and_then(|b| b.script_code(name)) {
            return Ok(ReorderCode::Script(script));
        }
        if name.eq_ignore_ascii_case("others") {
            return Ok(ReorderCode::OTHERS);
        }
        if name.eq_ignore_ascii_case("default") {
            return Ok(ReorderCode::Default);
        }
        Err(self
            .fail(codes::UNKNOWN_REORDER_CODE, "unknown script or reorder code")
            .with_details(ctx!("code" => name)))
    }

    /// Resolve `[import tag]` and parse the imported rules into the same
    /// sink and settings. Errors inside them are reported at this setting.
    fn parse_import(&mut self, tag: &str) -> Result<(), ParseError> {
        let Some((locale, collation_type)) = split_import_tag(tag) else {
            return Err(self
                .fail(
                    codes::INVALID_LANGUAGE_TAG,
                    "expected language tag in [import langTag]",
                )
                .with_details(ctx!("tag" => tag)));
        };
        if self.parser.importer.is_none() {
            return Err(self.fail(codes::IMPORT_UNSUPPORTED, "[import langTag] is not supported"));
        }
        if self.imports.len() >= self.parser.options.max_import_depth {
            return Err(self
                .fail(codes::IMPORT_TOO_DEEP, "[import langTag] nested too deeply")
                .with_details(ctx!(
                    "max_import_depth" => self.parser.options.max_import_depth.to_string(),
                )));
        }
        if self.imports.iter().any(|active| active == tag) {
            return Err(self
                .fail(codes::IMPORT_CYCLE, "[import langTag] cycle detected")
                .with_details(ctx!("tag" => tag)));
        }
        debug!("importing {locale} ({collation_type})");
        let imported = match self.parser.importer.as_deref_mut() {
            Some(importer) => importer.get_rules(&locale, &collation_type),
            None => Err(Rejected::new("[import langTag] is not supported")),
        };
        let imported = imported.map_err(|e| {
            self.rejected(codes::IMPORT_FAILED, e)
                .with_details(ctx!("tag" => tag))
        })?;

        self.imports.push(tag.to_string());
        let result = Frame {
            parser: &mut *self.parser,
            sink: &mut *self.sink,
            settings: &mut *self.settings,
            rules: &imported,
            rule_index: 0,
            imports: &mut *self.imports,
        }
        .run();
        self.imports.pop();
        result.map_err(|e| {
            e.reanchor(
                self.rules,
                self.rule_index,
                self.parser.options.context_len,
                tag,
            )
        })
    }
}

fn strength_value(value: &str) -> Option<Strength> {
    match value {
        "1" => Some(Strength::Primary),
        "2" => Some(Strength::Secondary),
        "3" => Some(Strength::Tertiary),
        "4" => Some(Strength::Quaternary),
        "I" => Some(Strength::Identical),
        _ => None,
    }
}

fn on_off(value: &str) -> Option<bool> {
    match value {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

/// Split an import tag such as `de-u-co-phonebk` into the language
/// identifier and the collation type.
///
/// Only the `co` key of the `-u-` extension is read; other Unicode
/// extension keys are accepted and ignored.
fn split_import_tag(tag: &str) -> Option<(LanguageIdentifier, String)> {
    let lower = tag.to_ascii_lowercase();
    let (lang, extension) = match lower.find("-u-") {
        Some(at) => (&tag[..at], Some(&lower[at + 3..])),
        None => (tag, None),
    };
    if lang.is_empty() {
        return None;
    }
    let locale: LanguageIdentifier = lang.parse().ok()?;
    let Some(extension) = extension else {
        return Some((locale, STANDARD_TYPE.to_string()));
    };

    let mut collation_type: Option<Vec<&str>> = None;
    let mut in_co = false;
    for subtag in extension.split('-') {
        if !(1..=8).contains(&subtag.len()) || !subtag.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
        if subtag.len() == 2 {
            in_co = subtag == "co";
            if in_co {
                collation_type.get_or_insert_with(Vec::new);
            }
        } else if subtag.len() >= 3 {
            if in_co {
                if let Some(parts) = collation_type.as_mut() {
                    parts.push(subtag);
                }
            }
        } else {
            // Another singleton starts a different extension.
            return None;
        }
    }
    match collation_type {
        Some(parts) if parts.is_empty() => None,
        Some(parts) => Some((locale, parts.join("-"))),
        None => Some((locale, STANDARD_TYPE.to_string())),
    }
}
