//! Presence-based mode selection for a work unit.

// self
use crate::host::WorkUnit;

/// Mode chosen for a work unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowMode {
	/// No code yet: produce the authorization URL.
	GenerateUrl,
	/// The callback delivered a code: redeem it.
	ExchangeCode,
}
impl FlowMode {
	/// Selects the mode from the presence of a non-blank code attribute.
	pub fn select(unit: &WorkUnit, code_attribute: &str) -> Self {
		if unit.non_empty_attribute(code_attribute).is_some() {
			FlowMode::ExchangeCode
		} else {
			FlowMode::GenerateUrl
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::host::CODE_ATTRIBUTE;

	#[test]
	fn code_presence_decides_the_mode() {
		assert_eq!(FlowMode::select(&WorkUnit::new(), CODE_ATTRIBUTE), FlowMode::GenerateUrl);
		assert_eq!(
			FlowMode::select(&WorkUnit::new().with_attribute(CODE_ATTRIBUTE, ""), CODE_ATTRIBUTE),
			FlowMode::GenerateUrl
		);
		assert_eq!(
			FlowMode::select(&WorkUnit::new().with_attribute(CODE_ATTRIBUTE, "xyz123"), CODE_ATTRIBUTE),
			FlowMode::ExchangeCode
		);
	}
}
