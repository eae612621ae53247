//! Shared test helpers for `coll_rules_core` integration tests.

#![allow(unreachable_pub)]

use std::collections::HashMap;

use coll_rules_core::{
    BaseData, CollationSettings, Directive, DirectiveLog, Importer, ParseError, Rejected,
    RuleParser, Sink, Strength,
};
use coll_rules_core::{CodePointSet, ResetPosition};
use unic_langid::LanguageIdentifier;

// ─── Collaborators ──────────────────────────────────────────────────────────

/// Base data that knows a handful of scripts and fills reorder tables with
/// the number of codes it was given.
#[derive(Debug, Default)]
pub struct FakeBase {
    /// Refuse every reorder table request.
    pub reject_tables: bool,
}

impl FakeBase {
    pub const GREK: u16 = 14;
    pub const LATN: u16 = 25;
    pub const CYRL: u16 = 8;
}

impl BaseData for FakeBase {
    fn script_code(&self, name: &str) -> Option<u16> {
        match name {
            "Grek" | "Greek" => Some(Self::GREK),
            "Latn" | "Latin" => Some(Self::LATN),
            "Cyrl" | "Cyrillic" => Some(Self::CYRL),
            _ => None,
        }
    }

    fn make_reorder_table(&self, codes: &[i32], table: &mut [u8; 256]) -> Result<(), Rejected> {
        if self.reject_tables {
            return Err(Rejected::new("reorder table unavailable"));
        }
        table.fill(codes.len() as u8);
        Ok(())
    }
}

/// Importer backed by a map from `tag` (or `tag@type` for non-standard
/// collation types) to rule text. Records every request.
#[derive(Debug, Default)]
pub struct MapImporter {
    pub rules: HashMap<String, String>,
    pub calls: Vec<(String, String)>,
}

impl MapImporter {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            rules: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            calls: Vec::new(),
        }
    }

    /// A small locale graph used across tests.
    pub fn sample() -> Self {
        Self::new([
            ("de", "&a < \u{E4} [caseFirst upper]"),
            ("de@phonebk", "&ae << \u{E4}"),
            ("sv", "[import de] &z < \u{E5}"),
            ("aa", "[import bb]"),
            ("bb", "[import aa]"),
            ("cc", "&c < d [import cc]"),
            ("xx", "&a <"),
        ])
    }
}

impl Importer for MapImporter {
    fn get_rules(
        &mut self,
        locale: &LanguageIdentifier,
        collation_type: &str,
    ) -> Result<String, Rejected> {
        self.calls
            .push((locale.to_string(), collation_type.to_string()));
        let key = if collation_type == "standard" {
            locale.to_string()
        } else {
            format!("{locale}@{collation_type}")
        };
        self.rules
            .get(&key)
            .cloned()
            .ok_or_else(|| Rejected::new(format!("no rules for {key}")))
    }
}

/// Sink that accepts a fixed number of directives and rejects the rest.
#[derive(Debug)]
pub struct FailingSink {
    pub accept: usize,
    pub log: DirectiveLog,
}

impl FailingSink {
    pub fn new(accept: usize) -> Self {
        Self {
            accept,
            log: DirectiveLog::new(),
        }
    }

    fn admit(&mut self) -> Result<(), Rejected> {
        if self.log.len() >= self.accept {
            Err(Rejected::new("builder is full"))
        } else {
            Ok(())
        }
    }
}

impl Sink for FailingSink {
    fn add_reset(&mut self, strength: Strength, position: &ResetPosition) -> Result<(), Rejected> {
        self.admit()?;
        self.log.add_reset(strength, position)
    }

    fn add_relation(
        &mut self,
        strength: Strength,
        prefix: &str,
        target: &str,
        extension: &str,
    ) -> Result<(), Rejected> {
        self.admit()?;
        self.log.add_relation(strength, prefix, target, extension)
    }

    fn suppress_contractions(&mut self, set: &CodePointSet) -> Result<(), Rejected> {
        self.admit()?;
        self.log.suppress_contractions(set)
    }
}

// ─── Parse helpers ──────────────────────────────────────────────────────────

/// Parse with default collaborators.
#[allow(dead_code)]
pub fn parse(rules: &str) -> Result<(DirectiveLog, CollationSettings), ParseError> {
    let mut log = DirectiveLog::new();
    let mut settings = CollationSettings::default();
    RuleParser::new().parse(rules, &mut log, &mut settings)?;
    Ok((log, settings))
}

/// Parse with [`FakeBase`] attached.
#[allow(dead_code)]
pub fn parse_with_base(rules: &str) -> Result<(DirectiveLog, CollationSettings), ParseError> {
    let base = FakeBase::default();
    let mut log = DirectiveLog::new();
    let mut settings = CollationSettings::default();
    RuleParser::new()
        .with_base(&base)
        .parse(rules, &mut log, &mut settings)?;
    Ok((log, settings))
}

/// Parse and return the error, panicking if parsing succeeds.
#[allow(dead_code)]
pub fn parse_err(rules: &str) -> ParseError {
    match parse_with_base(rules) {
        Ok((log, _)) => panic!("expected an error for {rules:?}, got {:?}", log.directives()),
        Err(e) => e,
    }
}

/// Relations as `(strength, target)` pairs.
#[allow(dead_code)]
pub fn relations(log: &DirectiveLog) -> Vec<(Strength, String)> {
    log.relations()
        .map(|r| (r.strength, r.target.clone()))
        .collect()
}

/// Reset positions in order.
#[allow(dead_code)]
pub fn resets(log: &DirectiveLog) -> Vec<(Strength, ResetPosition)> {
    log.directives()
        .iter()
        .filter_map(|d| match d {
            Directive::Reset { strength, position } => Some((*strength, position.clone())),
            _ => None,
        })
        .collect()
}

/// Shorthand for a text reset position.
#[allow(dead_code)]
pub fn text(s: &str) -> ResetPosition {
    ResetPosition::Text(s.to_string())
}
