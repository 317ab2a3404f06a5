//! Provider dialects, descriptors (data), and strategies (behavior).
//!
//! `adapter` defines the [`ProviderAdapter`] capability with one implementation per
//! dialect (`google`, `microsoft`). `descriptor` exposes the validated metadata each
//! adapter derives from the per-invocation configuration: HTTPS-only endpoints, client
//! authentication preference, and quirks. `strategy` classifies token endpoint
//! rejections without depending on any HTTP client.

pub mod adapter;
pub mod descriptor;
pub mod google;
pub mod kind;
pub mod microsoft;
pub mod strategy;

pub use adapter::{
	AdapterFuture, AuthorizationRequest, AuthorizationUrl, ExchangeRequest, ProviderAdapter,
	generate_state,
};
pub use descriptor::*;
pub use google::*;
pub use kind::*;
pub use microsoft::*;
pub use strategy::*;
