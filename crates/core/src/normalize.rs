//! Normalization services used while parsing tailoring strings.
//!
//! The parser only needs three operations: canonical decomposition (to
//! measure tailoring string length), contiguous canonical composition (the
//! form in which strings are handed to the builder), and an inertness test
//! for starred-relation code points. [`UnicodeNormalizer`] provides them on
//! top of the `unicode-normalization` crate; hosts with their own Unicode
//! data can supply another [`Normalizer`].

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::{canonical_combining_class, compose, decompose_canonical};

/// Stateless normalization operations.
pub trait Normalizer {
    /// Canonical decomposition (NFD).
    fn nfd(&self, s: &str) -> String;

    /// Contiguous canonical composition (FCC).
    ///
    /// Like NFC, except that a starter only composes with characters that
    /// directly follow it in the canonically ordered decomposition.
    fn fcc(&self, s: &str) -> String;

    /// Whether `c` is unaffected by NFD and never interacts with its
    /// neighbors under it.
    fn is_nfd_inert(&self, c: char) -> bool;
}

/// [`Normalizer`] backed by the `unicode-normalization` tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeNormalizer;

impl Normalizer for UnicodeNormalizer {
    fn nfd(&self, s: &str) -> String {
        s.nfd().collect()
    }

    fn fcc(&self, s: &str) -> String {
        let mut out: Vec<char> = Vec::with_capacity(s.len());
        // Index in `out` of the most recent starter, if it is still last.
        let mut starter: Option<usize> = None;
        for c in s.nfd() {
            if let Some(si) = starter {
                if si + 1 == out.len() {
                    if let Some(composed) = compose(out[si], c) {
                        out[si] = composed;
                        continue;
                    }
                }
            }
            out.push(c);
            starter = (canonical_combining_class(c) == 0).then(|| out.len() - 1);
        }
        out.into_iter().collect()
    }

    fn is_nfd_inert(&self, c: char) -> bool {
        if canonical_combining_class(c) != 0 {
            return false;
        }
        let mut unchanged = true;
        decompose_canonical(c, |d| unchanged &= d == c);
        unchanged
    }
}
