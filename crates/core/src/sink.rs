//! Collaborators the parser talks to while walking a rule string.
//!
//! The parser never builds collation data itself. Resets, relations and
//! suppressed contraction sets go to a [`Sink`]; `[import ...]` settings are
//! resolved through an [`Importer`]; script names and reorder tables come
//! from [`BaseData`]. Each collaborator may refuse a request with a
//! [`Rejected`] reason, which the parser turns into a positioned error.

use unic_langid::LanguageIdentifier;

use crate::grammar::directive::{Directive, Relation, ResetPosition, Strength};
use crate::uset::CodePointSet;

/// A collaborator refused a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct Rejected {
    /// Human-readable reason, reported as the parse error reason.
    pub reason: String,
}

impl Rejected {
    /// Create a refusal with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Receiver of parsed tailoring directives, typically a collation builder.
pub trait Sink {
    /// Start a rule chain anchored at `position`.
    ///
    /// `strength` is [`Strength::Identical`] for a plain reset and the
    /// `[before n]` strength otherwise.
    fn add_reset(&mut self, strength: Strength, position: &ResetPosition) -> Result<(), Rejected>;

    /// Add one tailoring edge to the current chain. `prefix` and `extension`
    /// are empty when absent.
    fn add_relation(
        &mut self,
        strength: Strength,
        prefix: &str,
        target: &str,
        extension: &str,
    ) -> Result<(), Rejected>;

    /// Suppress root contractions starting with any character of `set`.
    fn suppress_contractions(&mut self, set: &CodePointSet) -> Result<(), Rejected> {
        let _ = set;
        Ok(())
    }
}

/// Resolves `[import tag]` to another rule string.
pub trait Importer {
    /// Return the tailoring rules for `locale` and `collation_type`
    /// (`"standard"` unless the tag carried a `-u-co-` keyword).
    fn get_rules(
        &mut self,
        locale: &LanguageIdentifier,
        collation_type: &str,
    ) -> Result<String, Rejected>;
}

/// Read-only root collation data.
pub trait BaseData {
    /// Script property value for a script name or code such as `Latn` or
    /// `Greek`, if known.
    fn script_code(&self, name: &str) -> Option<u16>;

    /// Fill `table` with the lead byte permutation for `codes`.
    fn make_reorder_table(&self, codes: &[i32], table: &mut [u8; 256]) -> Result<(), Rejected>;
}

/// A [`Sink`] that records everything it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveLog {
    directives: Vec<Directive>,
}

impl DirectiveLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded directives in arrival order.
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Only the relations, in arrival order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.directives.iter().filter_map(|d| match d {
            Directive::Relation(r) => Some(r),
            _ => None,
        })
    }

    /// Number of recorded directives.
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Take the recorded directives, leaving the log empty.
    pub fn take(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.directives)
    }
}

impl Sink for DirectiveLog {
    fn add_reset(&mut self, strength: Strength, position: &ResetPosition) -> Result<(), Rejected> {
        self.directives.push(Directive::Reset {
            strength,
            position: position.clone(),
        });
        Ok(())
    }

    fn add_relation(
        &mut self,
        strength: Strength,
        prefix: &str,
        target: &str,
        extension: &str,
    ) -> Result<(), Rejected> {
        self.directives.push(Directive::Relation(Relation {
            strength,
            prefix: prefix.to_string(),
            target: target.to_string(),
            extension: extension.to_string(),
        }));
        Ok(())
    }

    fn suppress_contractions(&mut self, set: &CodePointSet) -> Result<(), Rejected> {
        self.directives.push(Directive::SuppressContractions { set: set.clone() });
        Ok(())
    }
}
