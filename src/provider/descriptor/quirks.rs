// self
use crate::_prelude::*;

/// Whether the client secret travels inside the credential bundle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretEmbedding {
	/// Leave the secret out; the refreshing process supplies its own copy.
	#[default]
	Omit,
	/// Embed the secret because the refresh grant needs a confidential client.
	Embed,
}

/// Provider-specific quirks that shape the authorization URL and the exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Send the `scope` parameter on the token request as well as the authorization URL.
	pub scope_on_exchange: bool,
	/// Secret handling for the refresh configuration.
	pub secret_embedding: SecretEmbedding,
	/// Character used to join scopes when constructing `scope` parameters.
	pub scope_delimiter: char,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { scope_on_exchange: false, secret_embedding: SecretEmbedding::Omit, scope_delimiter: ' ' }
	}
}
