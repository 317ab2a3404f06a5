// self
use crate::{_prelude::*, error::ErrorKind, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by the coordinator.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_handoff.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits the error event that accompanies every failed invocation.
pub fn log_flow_failure(kind: FlowKind, error: ErrorKind, message: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(flow = kind.as_str(), error.kind = error.as_str(), "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error, message);
	}
}

/// Emits a warning for a callback whose `state` could not be checked.
pub fn log_unverified_state() {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			flow = FlowKind::CodeExchange.as_str(),
			"No expected state available; returned state passed through unverified."
		);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn logging_without_subscriber_is_noop() {
		let _span = FlowSpan::new(FlowKind::AuthorizationUrl, "test");

		log_flow_failure(FlowKind::AuthorizationUrl, ErrorKind::Configuration, "missing");
		log_unverified_state();
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::CodeExchange, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
