//! Optional observability helpers for coordinator invocations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_handoff.flow` with the `flow`
//!   (mode) and `stage` (call site) fields, plus `warn`/`error` events for failures.
//! - Enable `metrics` to increment the `oauth2_handoff_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Coordinator modes observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization URL synthesis.
	AuthorizationUrl,
	/// Authorization code redemption.
	CodeExchange,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::AuthorizationUrl => "authorization_url",
			FlowKind::CodeExchange => "code_exchange",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Invocation entered the mode.
	Attempt,
	/// Invocation completed successfully.
	Success,
	/// Invocation failed.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
