//! Provider selector values.

// self
use crate::{_prelude::*, error::ConfigError};

/// Identity provider dialects understood by the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
	/// Consumer identity provider with fixed endpoints and forced consent.
	Google,
	/// Enterprise identity provider with tenant-templated authorities.
	Microsoft,
}
impl ProviderKind {
	/// Returns the selector label used in properties and bundles.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::Google => "google",
			ProviderKind::Microsoft => "microsoft",
		}
	}

	/// Returns `true` when the provider partitions clients by tenant.
	pub const fn supports_tenancy(self) -> bool {
		matches!(self, ProviderKind::Microsoft)
	}

	/// Returns `true` when the refresh grant needs a confidential client secret.
	pub const fn requires_client_secret(self) -> bool {
		matches!(self, ProviderKind::Microsoft)
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ProviderKind {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"google" => Ok(ProviderKind::Google),
			"microsoft" => Ok(ProviderKind::Microsoft),
			_ => Err(ConfigError::UnknownProvider { value: s.to_owned() }),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn selector_parsing_is_case_insensitive() {
		assert_eq!("Google".parse::<ProviderKind>().ok(), Some(ProviderKind::Google));
		assert_eq!(" MICROSOFT ".parse::<ProviderKind>().ok(), Some(ProviderKind::Microsoft));
		assert!(matches!(
			"okta".parse::<ProviderKind>(),
			Err(ConfigError::UnknownProvider { .. })
		));
		assert!(matches!(
			"azure".parse::<ProviderKind>(),
			Err(ConfigError::UnknownProvider { .. })
		));
	}

	#[test]
	fn only_microsoft_is_multi_tenant() {
		assert!(ProviderKind::Microsoft.supports_tenancy());
		assert!(!ProviderKind::Google.supports_tenancy());
		assert!(ProviderKind::Microsoft.requires_client_secret());
		assert!(!ProviderKind::Google.requires_client_secret());
	}
}
