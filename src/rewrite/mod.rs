//! Response header rewriting.
//!
//! # Data Flow
//! ```text
//! RewriteConfig (ordered {header, regex, replacement} list)
//!     → rule.rs (compile into RuleSet, all-or-nothing)
//!     → layer.rs (HeaderRewriteLayer wraps the next service)
//!
//! Per request:
//!     inner service produces Response
//!     → response.rs (InterceptedResponse)
//!     → finalize: apply every rule in order, exactly once
//!     → head + untouched body returned to the server
//! ```
//!
//! # Design Decisions
//! - Rules are applied when the inner response future resolves, which is
//!   the last moment headers can change before the head is written
//! - RuleSet is immutable and shared across requests without locking
//! - Reporting goes through an injected `RewriteObserver`

pub mod error;
pub mod layer;
pub mod observer;
pub mod response;
pub mod rule;

pub use error::RewriteError;
pub use layer::{new_handler, HeaderRewrite, HeaderRewriteLayer};
pub use observer::{NoopObserver, RewriteObserver, TracingObserver};
pub use response::InterceptedResponse;
pub use rule::{RewriteRule, RuleSet};
