//! Coordinator-wide settings.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::StateValidation,
	host::{CODE_ATTRIBUTE, EXPECTED_STATE_ATTRIBUTE, STATE_ATTRIBUTE},
};

/// Settings shared by every invocation of a [`crate::flows::FlowCoordinator`].
///
/// Deserializable from JSON; absent fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorSettings {
	/// Upper bound on the token endpoint round trip, in seconds (clamped to 1..=120).
	pub exchange_timeout_secs: u64,
	/// How the returned `state` is checked before the exchange.
	pub state_validation: StateValidation,
	/// Attribute holding the authorization code.
	pub code_attribute: String,
	/// Attribute holding the returned `state`.
	pub state_attribute: String,
	/// Attribute holding the state issued with the authorization URL.
	pub expected_state_attribute: String,
}
impl CoordinatorSettings {
	/// Default exchange bound.
	pub const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 20;
	/// Largest accepted exchange bound.
	pub const MAX_EXCHANGE_TIMEOUT_SECS: u64 = 120;
	/// Smallest accepted exchange bound.
	pub const MIN_EXCHANGE_TIMEOUT_SECS: u64 = 1;

	/// Parses settings from JSON.
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut de).map_err(|source| ConfigError::Settings { source })
	}

	/// Sets the exchange bound in seconds.
	pub fn with_exchange_timeout_secs(mut self, secs: u64) -> Self {
		self.exchange_timeout_secs = secs;

		self
	}

	/// Sets the state validation policy.
	pub fn with_state_validation(mut self, policy: StateValidation) -> Self {
		self.state_validation = policy;

		self
	}

	/// Effective exchange bound after clamping.
	pub fn exchange_timeout(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.exchange_timeout_secs.clamp(
			Self::MIN_EXCHANGE_TIMEOUT_SECS,
			Self::MAX_EXCHANGE_TIMEOUT_SECS,
		))
	}
}
impl Default for CoordinatorSettings {
	fn default() -> Self {
		Self {
			exchange_timeout_secs: Self::DEFAULT_EXCHANGE_TIMEOUT_SECS,
			state_validation: StateValidation::default(),
			code_attribute: CODE_ATTRIBUTE.into(),
			state_attribute: STATE_ATTRIBUTE.into(),
			expected_state_attribute: EXPECTED_STATE_ATTRIBUTE.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let settings = CoordinatorSettings::from_json(r#"{"state_validation":"require"}"#)
			.expect("Partial settings should parse.");

		assert_eq!(settings.state_validation, StateValidation::Require);
		assert_eq!(settings.exchange_timeout(), std::time::Duration::from_secs(20));
		assert_eq!(settings.code_attribute, CODE_ATTRIBUTE);
	}

	#[test]
	fn timeout_is_clamped() {
		let low = CoordinatorSettings::default().with_exchange_timeout_secs(0);
		let high = CoordinatorSettings::default().with_exchange_timeout_secs(3_600);

		assert_eq!(low.exchange_timeout(), std::time::Duration::from_secs(1));
		assert_eq!(high.exchange_timeout(), std::time::Duration::from_secs(120));
	}

	#[test]
	fn malformed_json_reports_the_path() {
		let err = CoordinatorSettings::from_json(r#"{"exchange_timeout_secs":"soon"}"#)
			.expect_err("String timeout must fail.");

		match err {
			ConfigError::Settings { source } =>
				assert_eq!(source.path().to_string(), "exchange_timeout_secs"),
			other => panic!("Unexpected error: {other:?}."),
		}
	}
}
