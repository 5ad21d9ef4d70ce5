//! Tower layer that rewrites response headers.
//!
//! The rules run when the inner service's response future resolves. At that
//! point the inner handler has made all of its header changes and nothing
//! has been written to the client yet: the head is sent only after the
//! service returns, and the body streams after that.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::config::RewriteConfig;
use crate::rewrite::error::RewriteError;
use crate::rewrite::observer::{NoopObserver, RewriteObserver, TracingObserver};
use crate::rewrite::response::InterceptedResponse;
use crate::rewrite::rule::RuleSet;

/// Builds [`HeaderRewrite`] services sharing one compiled rule set.
#[derive(Clone)]
pub struct HeaderRewriteLayer {
    name: Arc<str>,
    rules: RuleSet,
    observer: Arc<dyn RewriteObserver>,
}

impl HeaderRewriteLayer {
    /// Compile `config` and report the loaded rules through `tracing`.
    pub fn new(name: &str, config: &RewriteConfig) -> Result<Self, RewriteError> {
        Self::with_observer(name, config, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        name: &str,
        config: &RewriteConfig,
        observer: Arc<dyn RewriteObserver>,
    ) -> Result<Self, RewriteError> {
        let rules = RuleSet::compile(config)?;
        for rule in rules.iter() {
            observer.rule_compiled(name, rule);
        }

        Ok(Self {
            name: name.into(),
            rules,
            observer,
        })
    }

    /// Use an already compiled rule set. Events are discarded.
    pub fn from_rules(name: &str, rules: RuleSet) -> Self {
        Self {
            name: name.into(),
            rules,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl<S> Layer<S> for HeaderRewriteLayer {
    type Service = HeaderRewrite<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HeaderRewrite {
            inner,
            name: self.name.clone(),
            rules: self.rules.clone(),
            observer: self.observer.clone(),
        }
    }
}

/// Wraps an inner service and rewrites the headers of its responses.
#[derive(Clone)]
pub struct HeaderRewrite<S> {
    inner: S,
    name: Arc<str>,
    rules: RuleSet,
    observer: Arc<dyn RewriteObserver>,
}

impl<S> HeaderRewrite<S> {
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for HeaderRewrite<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let future = self.inner.call(request);
        let name = self.name.clone();
        let rules = self.rules.clone();
        let observer = self.observer.clone();

        Box::pin(async move {
            let response = future.await?;
            if rules.is_empty() {
                return Ok(response);
            }
            let intercepted = InterceptedResponse::new(response, &rules, &name, observer.as_ref());
            Ok(intercepted.finalize())
        })
    }
}

/// Wrap `next` with a header rewrite interceptor named `name`.
///
/// Fails if any configured pattern does not compile; no partially
/// configured interceptor is ever returned.
pub fn new_handler<S>(
    next: S,
    config: &RewriteConfig,
    name: &str,
) -> Result<HeaderRewrite<S>, RewriteError> {
    Ok(HeaderRewriteLayer::new(name, config)?.layer(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rewrite;
    use axum::http::{HeaderValue, StatusCode};
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::{service_fn, ServiceBuilder, ServiceExt};
    use tower_http::timeout::TimeoutLayer;

    fn config(rules: &[(&str, &str, &str)]) -> RewriteConfig {
        RewriteConfig {
            rewrites: rules
                .iter()
                .map(|(header, regex, replacement)| Rewrite {
                    header: header.to_string(),
                    regex: regex.to_string(),
                    replacement: replacement.to_string(),
                })
                .collect(),
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        compiled: AtomicUsize,
        rewritten: AtomicUsize,
    }

    impl RewriteObserver for CountingObserver {
        fn rule_compiled(&self, _instance: &str, _rule: &crate::rewrite::RewriteRule) {
            self.compiled.fetch_add(1, Ordering::SeqCst);
        }

        fn header_rewritten(
            &self,
            _instance: &str,
            _header: &axum::http::HeaderName,
            _before: &HeaderValue,
            _after: &HeaderValue,
        ) {
            self.rewritten.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_location_rewritten() {
        let inner = service_fn(|_req: Request<()>| async {
            let mut response = Response::new("ok");
            response.headers_mut().insert(
                "location",
                HeaderValue::from_static("http://example.com/path"),
            );
            Ok::<_, Infallible>(response)
        });

        let service = new_handler(
            inner,
            &config(&[("Location", "^http://", "https://")]),
            "test",
        )
        .unwrap();

        let response = service.oneshot(Request::new(())).await.unwrap();
        assert_eq!(
            response.headers().get("location").unwrap(),
            "https://example.com/path"
        );
    }

    #[tokio::test]
    async fn test_rules_applied_exactly_once() {
        // A rule that is not idempotent exposes double application.
        let observer = Arc::new(CountingObserver::default());
        let layer = HeaderRewriteLayer::with_observer(
            "once",
            &config(&[("X-Count", "$", "+")]),
            observer.clone(),
        )
        .unwrap();
        assert_eq!(observer.compiled.load(Ordering::SeqCst), 1);

        let inner = service_fn(|_req: Request<()>| async {
            let mut response = Response::new(());
            response
                .headers_mut()
                .insert("x-count", HeaderValue::from_static("n"));
            Ok::<_, Infallible>(response)
        });

        let response = layer.layer(inner).oneshot(Request::new(())).await.unwrap();
        assert_eq!(response.headers().get("x-count").unwrap(), "n+");
        assert_eq!(observer.rewritten.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_status_and_body_untouched() {
        let inner = service_fn(|_req: Request<()>| async {
            let response = Response::builder()
                .status(StatusCode::IM_A_TEAPOT)
                .header("x-id", "a-b")
                .body("a-b")
                .unwrap();
            Ok::<_, Infallible>(response)
        });

        let service = new_handler(inner, &config(&[("X-Id", "-", "_")]), "test").unwrap();
        let response = service.oneshot(Request::new(())).await.unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.headers().get("x-id").unwrap(), "a_b");
        assert_eq!(*response.body(), "a-b");
    }

    #[tokio::test]
    async fn test_inner_error_propagates() {
        let inner = service_fn(|_req: Request<()>| async {
            Err::<Response<()>, _>(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))
        });

        let service = new_handler(inner, &config(&[("X-Any", "a", "b")]), "test").unwrap();
        let err = service.oneshot(Request::new(())).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);
    }

    #[tokio::test]
    async fn test_invalid_config_builds_nothing() {
        let inner = service_fn(|_: Request<()>| async { Ok::<_, Infallible>(Response::new(())) });

        let rules = config(&[("X-Ok", "ok", "x"), ("X-Bad", "(abc", "x")]);
        let result = new_handler(inner, &rules, "test");
        assert!(matches!(result, Err(RewriteError::InvalidPattern { .. })));
    }

    #[tokio::test]
    #[allow(deprecated)]
    async fn test_sees_responses_generated_by_inner_layers() {
        let rules = config(&[("X-Status", "^408$", "timed-out")]);
        let layer = HeaderRewriteLayer::new("test", &rules).unwrap();
        let slow = service_fn(|_req: Request<()>| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, Infallible>(Response::new(String::new()))
        });

        let service = ServiceBuilder::new()
            .layer(layer)
            .map_response(|mut response: Response<String>| {
                let status = HeaderValue::from(response.status().as_u16());
                response.headers_mut().insert("x-status", status);
                response
            })
            .layer(TimeoutLayer::new(Duration::from_millis(20)))
            .service(slow);

        let response = service.oneshot(Request::new(())).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(response.headers()["x-status"], "timed-out");
    }

    #[tokio::test]
    async fn test_layer_shared_across_requests() {
        let layer = HeaderRewriteLayer::new("shared", &config(&[("X-Req", "^", "seen:")])).unwrap();
        let service = layer.layer(service_fn(|req: Request<String>| async move {
            let mut response = Response::new(());
            response
                .headers_mut()
                .insert("x-req", HeaderValue::from_str(req.body()).unwrap());
            Ok::<_, Infallible>(response)
        }));

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let response = service.oneshot(Request::new(i.to_string())).await.unwrap();
                (i, response.headers().get("x-req").unwrap().clone())
            }));
        }

        for handle in handles {
            let (i, value) = handle.await.unwrap();
            assert_eq!(value, format!("seen:{i}"));
        }
    }
}
