//! Rule compilation and application.
//!
//! # Responsibilities
//! - Compile configured `{header, regex, replacement}` triples into rules
//! - Apply rules to a response header map in configuration order
//!
//! # Design Decisions
//! - All-or-nothing compilation: one bad pattern rejects the whole set
//! - Values are rewritten as bytes, so non-UTF-8 header values still work
//! - Rules targeting the same header compose: each sees the previous output

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use regex::bytes::Regex;

use crate::config::RewriteConfig;
use crate::rewrite::error::RewriteError;
use crate::rewrite::observer::RewriteObserver;

/// A single compiled rewrite rule.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    /// Header name as written in the configuration.
    configured: String,
    /// `None` when the configured name is empty or not a legal field name;
    /// such a rule never matches.
    header: Option<HeaderName>,
    pattern: Regex,
    replacement: Vec<u8>,
}

impl RewriteRule {
    /// Compile a single rule.
    ///
    /// Only the pattern can fail. A header name that no response could carry
    /// yields a rule that never matches.
    pub fn new(header: &str, pattern: &str, replacement: &str) -> Result<Self, RewriteError> {
        let compiled = Regex::new(pattern).map_err(|source| RewriteError::InvalidPattern {
            header: header.to_string(),
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            configured: header.to_string(),
            header: HeaderName::from_bytes(header.as_bytes()).ok(),
            pattern: compiled,
            replacement: replacement.as_bytes().to_vec(),
        })
    }

    /// The header name as it appeared in the configuration.
    pub fn header(&self) -> &str {
        &self.configured
    }

    /// Normalized header name, if the rule targets one.
    pub fn header_name(&self) -> Option<&HeaderName> {
        self.header.as_ref()
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> String {
        String::from_utf8_lossy(&self.replacement).into_owned()
    }

    /// Replace every match of the pattern in `value`.
    ///
    /// A value with no match comes back unchanged.
    pub fn rewrite_value(&self, value: &[u8]) -> Vec<u8> {
        self.pattern
            .replace_all(value, self.replacement.as_slice())
            .into_owned()
    }

    /// Apply this rule to every value of its header.
    ///
    /// Returns the number of values whose content changed.
    pub fn apply(
        &self,
        headers: &mut HeaderMap,
        instance: &str,
        observer: &dyn RewriteObserver,
    ) -> usize {
        let Some(name) = &self.header else {
            return 0;
        };

        let originals: Vec<HeaderValue> = headers.get_all(name).iter().cloned().collect();
        if originals.is_empty() {
            return 0;
        }

        headers.remove(name);

        let mut changed = 0;
        for original in originals {
            let rewritten = self.rewrite_value(original.as_bytes());
            if rewritten.as_slice() == original.as_bytes() {
                headers.append(name.clone(), original);
                continue;
            }

            match HeaderValue::from_bytes(&rewritten) {
                Ok(value) => {
                    observer.header_rewritten(instance, name, &original, &value);
                    headers.append(name.clone(), value);
                    changed += 1;
                }
                Err(_) => {
                    observer.value_rejected(instance, name, &original, &rewritten);
                    headers.append(name.clone(), original);
                }
            }
        }

        changed
    }
}

/// Ordered, immutable collection of compiled rules.
///
/// Cloning is cheap; all clones share the same rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Arc<[RewriteRule]>,
}

impl RuleSet {
    /// Compile every configured rewrite, preserving order.
    pub fn compile(config: &RewriteConfig) -> Result<Self, RewriteError> {
        let rules = config
            .rewrites
            .iter()
            .map(|r| RewriteRule::new(&r.header, &r.regex, &r.replacement))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules: rules.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter()
    }

    /// Apply all rules in order. Returns the total number of values changed.
    pub fn apply(
        &self,
        headers: &mut HeaderMap,
        instance: &str,
        observer: &dyn RewriteObserver,
    ) -> usize {
        self.rules
            .iter()
            .map(|rule| rule.apply(headers, instance, observer))
            .sum()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl From<Vec<RewriteRule>> for RuleSet {
    fn from(rules: Vec<RewriteRule>) -> Self {
        Self {
            rules: rules.into(),
        }
    }
}
