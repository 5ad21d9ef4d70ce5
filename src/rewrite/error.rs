//! Rule construction errors.

use thiserror::Error;

/// Errors raised while compiling a rule set.
///
/// These only ever surface at construction time. Once a [`RuleSet`](super::RuleSet)
/// exists, applying it cannot fail.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("error compiling regex {pattern:?} for header {header:?}: {source}")]
    InvalidPattern {
        header: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
