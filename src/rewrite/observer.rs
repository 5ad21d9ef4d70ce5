//! Observability hooks for the rewrite middleware.
//!
//! The observer is handed to the layer at construction instead of relying
//! on a module-level logger, so each middleware instance can report (or
//! stay silent) independently.

use axum::http::{HeaderName, HeaderValue};

use crate::observability::metrics;
use crate::rewrite::rule::RewriteRule;

/// Receives rewrite events. All methods default to doing nothing.
pub trait RewriteObserver: Send + Sync {
    /// Called once per rule when a layer is built.
    fn rule_compiled(&self, _instance: &str, _rule: &RewriteRule) {}

    /// Called for each header value whose content changed.
    fn header_rewritten(
        &self,
        _instance: &str,
        _header: &HeaderName,
        _before: &HeaderValue,
        _after: &HeaderValue,
    ) {
    }

    /// Called when a rewritten value is not a legal header value and the
    /// original was kept instead.
    fn value_rejected(
        &self,
        _instance: &str,
        _header: &HeaderName,
        _original: &HeaderValue,
        _rewritten: &[u8],
    ) {
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RewriteObserver for NoopObserver {}

/// Reports events through `tracing` and the metrics recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RewriteObserver for TracingObserver {
    fn rule_compiled(&self, instance: &str, rule: &RewriteRule) {
        tracing::info!(
            instance = %instance,
            header = %rule.header(),
            pattern = ?rule.pattern(),
            replacement = %rule.replacement(),
            "Header rewrite rule loaded"
        );
    }

    fn header_rewritten(
        &self,
        instance: &str,
        header: &HeaderName,
        before: &HeaderValue,
        after: &HeaderValue,
    ) {
        tracing::debug!(
            instance = %instance,
            header = %header,
            before = ?before,
            after = ?after,
            "Rewrote response header"
        );
        metrics::record_rewrite(instance, header.as_str());
    }

    fn value_rejected(
        &self,
        instance: &str,
        header: &HeaderName,
        original: &HeaderValue,
        rewritten: &[u8],
    ) {
        tracing::warn!(
            instance = %instance,
            header = %header,
            original = ?original,
            rewritten = %String::from_utf8_lossy(rewritten),
            "Rewritten value is not a valid header value, keeping original"
        );
        metrics::record_rewrite_rejected(instance, header.as_str());
    }
}
