use coll_rules_diagnostics::DEFAULT_CONTEXT_LEN;
use serde::Deserialize;

/// Default limit on nested `[import ...]` settings.
pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 16;

/// Tunables for [`RuleParser`](crate::RuleParser).
///
/// Deserializable so hosts can keep it alongside their own configuration;
/// missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct ParserOptions {
    /// How many `[import ...]` levels may be active at once.
    pub max_import_depth: usize,
    /// Size of the error context buffers; each window holds at most one
    /// byte less than this.
    pub context_len: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
            context_len: DEFAULT_CONTEXT_LEN,
        }
    }
}

impl ParserOptions {
    /// Set the import nesting limit.
    pub fn max_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth;
        self
    }

    /// Set the context buffer size.
    pub fn context_len(mut self, len: usize) -> Self {
        self.context_len = len;
        self
    }
}
