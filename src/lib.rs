//! Response header rewriting middleware.
//!
//! A `tower` layer that rewrites response header values with ordered
//! regular-expression substitutions, plus a small reverse proxy host that
//! mounts it in front of a single upstream.
//!
//! ```
//! use rewrite_headers::config::{Rewrite, RewriteConfig};
//! use rewrite_headers::rewrite::HeaderRewriteLayer;
//!
//! let config = RewriteConfig {
//!     rewrites: vec![Rewrite {
//!         header: "Location".into(),
//!         regex: "^http://".into(),
//!         replacement: "https://".into(),
//!     }],
//! };
//! let layer = HeaderRewriteLayer::new("force-https", &config).unwrap();
//! assert_eq!(layer.rules().len(), 1);
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use rewrite::{new_handler, HeaderRewrite, HeaderRewriteLayer, RuleSet};
