//! Per-request response wrapper.

use axum::http::{HeaderMap, Response, StatusCode};

use crate::rewrite::observer::RewriteObserver;
use crate::rewrite::rule::RuleSet;

/// Wraps the response produced by the inner service until its head is
/// committed.
///
/// Every accessor forwards to the wrapped response; the wrapper keeps no
/// header state of its own. [`finalize`](Self::finalize) is the single point
/// where rules run, and it consumes the wrapper, so a response can never be
/// rewritten twice.
pub struct InterceptedResponse<'a, B> {
    response: Response<B>,
    rules: &'a RuleSet,
    instance: &'a str,
    observer: &'a dyn RewriteObserver,
}

impl<'a, B> InterceptedResponse<'a, B> {
    pub fn new(
        response: Response<B>,
        rules: &'a RuleSet,
        instance: &'a str,
        observer: &'a dyn RewriteObserver,
    ) -> Self {
        Self {
            response,
            rules,
            instance,
            observer,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn status_mut(&mut self) -> &mut StatusCode {
        self.response.status_mut()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.response.headers_mut()
    }

    pub fn body_mut(&mut self) -> &mut B {
        self.response.body_mut()
    }

    /// Apply the rule set to the final headers and release the response.
    pub fn finalize(mut self) -> Response<B> {
        let changed = self
            .rules
            .apply(self.response.headers_mut(), self.instance, self.observer);
        if changed > 0 {
            tracing::trace!(instance = %self.instance, changed, "Response headers rewritten");
        }
        self.response
    }
}
