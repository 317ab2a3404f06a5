//! Checks the `state` returned by the authorization callback.

// self
use crate::_prelude::*;

/// Policy applied to the returned `state` before any exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateValidation {
	/// Ignore the returned state entirely.
	Passthrough,
	/// Compare against the expected state when the host supplied one.
	#[default]
	MatchWhenExpected,
	/// Both values must be present and equal.
	Require,
}
impl StateValidation {
	/// Applies the policy.
	pub fn check(self, returned: Option<&str>, expected: Option<&str>) -> Result<StateCheck> {
		let expected = match (self, expected) {
			(StateValidation::Passthrough, _) => return Ok(StateCheck::Skipped),
			(StateValidation::MatchWhenExpected, None) => return Ok(StateCheck::Unverified),
			(StateValidation::Require, None) =>
				return Err(Error::StateMismatch { reason: "no expected state is available" }),
			(_, Some(expected)) => expected,
		};

		match returned {
			None => Err(Error::StateMismatch { reason: "callback carried no state" }),
			Some(returned) if returned != expected =>
				Err(Error::StateMismatch { reason: "returned state differs from the issued state" }),
			Some(_) => Ok(StateCheck::Verified),
		}
	}
}

/// Result of a passing [`StateValidation::check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateCheck {
	/// Returned state matched the expected one.
	Verified,
	/// No expected state was available; the value passed through.
	Unverified,
	/// Validation is disabled.
	Skipped,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn match_when_expected_only_checks_with_an_expectation() {
		let policy = StateValidation::MatchWhenExpected;

		assert_eq!(policy.check(Some("a"), None).ok(), Some(StateCheck::Unverified));
		assert_eq!(policy.check(Some("a"), Some("a")).ok(), Some(StateCheck::Verified));
		assert!(matches!(policy.check(Some("a"), Some("b")), Err(Error::StateMismatch { .. })));
		assert!(matches!(policy.check(None, Some("b")), Err(Error::StateMismatch { .. })));
	}

	#[test]
	fn require_demands_both_values() {
		let policy = StateValidation::Require;

		assert!(policy.check(Some("a"), None).is_err());
		assert!(policy.check(None, Some("a")).is_err());
		assert_eq!(policy.check(Some("a"), Some("a")).ok(), Some(StateCheck::Verified));
	}

	#[test]
	fn passthrough_never_fails() {
		assert_eq!(
			StateValidation::Passthrough.check(Some("a"), Some("b")).ok(),
			Some(StateCheck::Skipped)
		);
	}
}
