//! Refresh-ready credential bundles and their validating builder.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, ScopeSet, Secret, TenantId},
	provider::ProviderKind,
};

/// Errors produced by [`CredentialBundleBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialBundleBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when the access token is an empty string.
	#[error("Access token cannot be empty.")]
	EmptyAccessToken,
	/// Issued when no token type was provided.
	#[error("Token type is required.")]
	MissingTokenType,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// Issued when the expiry does not lie after the issued-at instant.
	#[error("Expiry must be later than the issued-at instant.")]
	NonPositiveLifetime,
	/// Issued when the relative expiry lands outside the representable date range.
	#[error("Expiry lies outside the supported date range.")]
	ExpiryOutOfRange,
}

/// Provider configuration embedded in a bundle so a later process can refresh the token.
///
/// The client secret is only present for providers whose refresh grant requires a
/// confidential client; see [`crate::provider::SecretEmbedding`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfiguration {
	/// Provider that minted the tokens.
	pub provider: ProviderKind,
	/// OAuth client identifier.
	pub client_id: ClientId,
	/// Client secret, embedded only when the provider needs it for refresh.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<Secret>,
	/// Tenant used to build the authority, for multi-tenant providers.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tenant: Option<TenantId>,
	/// Scopes as configured by the operator.
	pub scopes: ScopeSet,
	/// Token endpoint to call for `grant_type=refresh_token`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_endpoint: Option<Url>,
}

/// Normalized token payload with an absolute expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
	/// Access token secret.
	pub access_token: Secret,
	/// Refresh token secret, if the provider issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<Secret>,
	/// Absolute expiry instant, converted from `expires_in` at receipt time.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
	/// Token type reported by the provider (usually `Bearer`).
	pub token_type: String,
	/// Scopes the provider reports as granted.
	pub scope: ScopeSet,
}
impl Debug for TokenData {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenData")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.finish()
	}
}

/// Provider-agnostic success payload of a code exchange.
///
/// Serializes to `{"configuration": {...}, "token_data": {...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBundle {
	/// Refresh configuration.
	pub configuration: RefreshConfiguration,
	/// Issued tokens.
	pub token_data: TokenData,
}
impl CredentialBundle {
	/// Returns a builder seeded with the refresh configuration.
	pub fn builder(configuration: RefreshConfiguration) -> CredentialBundleBuilder {
		CredentialBundleBuilder::new(configuration)
	}

	/// Serializes the bundle as indented JSON.
	pub fn to_json_pretty(&self) -> Result<String, crate::error::ConfigError> {
		serde_json::to_string_pretty(self).map_err(crate::error::ConfigError::BundleSerialize)
	}
}

/// Builder for [`CredentialBundle`].
#[derive(Clone, Debug)]
pub struct CredentialBundleBuilder {
	configuration: RefreshConfiguration,
	access_token: Option<Secret>,
	refresh_token: Option<Secret>,
	token_type: Option<String>,
	granted_scope: Option<ScopeSet>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl CredentialBundleBuilder {
	fn new(configuration: RefreshConfiguration) -> Self {
		Self {
			configuration,
			access_token: None,
			refresh_token: None,
			token_type: None,
			granted_scope: None,
			issued_at: None,
			expires_at: None,
			expires_in: None,
		}
	}

	/// Sets the receipt instant that relative expiries are measured from.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Convenience helper that stamps `issued_at` with the current clock.
	pub fn issued_now(self) -> Self {
		self.issued_at(OffsetDateTime::now_utc())
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(Secret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(Secret::new(token));

		self
	}

	/// Provides the token type.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Provides the granted scopes; defaults to the configured scopes.
	pub fn granted_scope(mut self, scope: ScopeSet) -> Self {
		self.granted_scope = Some(scope);

		self
	}

	/// Consumes the builder and produces a [`CredentialBundle`].
	pub fn build(self) -> Result<CredentialBundle, CredentialBundleBuilderError> {
		let access_token =
			self.access_token.ok_or(CredentialBundleBuilderError::MissingAccessToken)?;

		if access_token.expose().is_empty() {
			return Err(CredentialBundleBuilderError::EmptyAccessToken);
		}

		let token_type = self
			.token_type
			.filter(|value| !value.is_empty())
			.ok_or(CredentialBundleBuilderError::MissingTokenType)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at
				.checked_add(delta)
				.ok_or(CredentialBundleBuilderError::ExpiryOutOfRange)?,
			(None, None) => return Err(CredentialBundleBuilderError::MissingExpiry),
		};

		if expires_at <= issued_at {
			return Err(CredentialBundleBuilderError::NonPositiveLifetime);
		}

		let scope = self.granted_scope.unwrap_or_else(|| self.configuration.scopes.clone());

		Ok(CredentialBundle {
			configuration: self.configuration,
			token_data: TokenData {
				access_token,
				refresh_token: self.refresh_token,
				expires_at,
				token_type,
				scope,
			},
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn configuration(secret: Option<&str>) -> RefreshConfiguration {
		RefreshConfiguration {
			provider: ProviderKind::Microsoft,
			client_id: ClientId::new("abc").expect("Client fixture should be valid."),
			client_secret: secret.map(Secret::new),
			tenant: Some(TenantId::common()),
			scopes: ScopeSet::new(["User.Read"]).expect("Scope fixture should be valid."),
			token_endpoint: None,
		}
	}

	#[test]
	fn relative_expiry_becomes_absolute() {
		let bundle = CredentialBundle::builder(configuration(None))
			.access_token("T")
			.token_type("Bearer")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::seconds(3600))
			.build()
			.expect("Bundle builder should accept a relative expiry.");

		assert_eq!(bundle.token_data.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
		assert_eq!(bundle.token_data.scope, bundle.configuration.scopes);
	}

	#[test]
	fn incomplete_bundles_are_rejected() {
		let missing_token = CredentialBundle::builder(configuration(None))
			.token_type("Bearer")
			.expires_in(Duration::seconds(60))
			.build();

		assert_eq!(missing_token.err(), Some(CredentialBundleBuilderError::MissingAccessToken));

		let missing_expiry =
			CredentialBundle::builder(configuration(None)).access_token("T").token_type("Bearer").build();

		assert_eq!(missing_expiry.err(), Some(CredentialBundleBuilderError::MissingExpiry));

		let zero_lifetime = CredentialBundle::builder(configuration(None))
			.access_token("T")
			.token_type("Bearer")
			.expires_in(Duration::ZERO)
			.build();

		assert_eq!(zero_lifetime.err(), Some(CredentialBundleBuilderError::NonPositiveLifetime));

		let missing_type = CredentialBundle::builder(configuration(None))
			.access_token("T")
			.expires_in(Duration::seconds(60))
			.build();

		assert_eq!(missing_type.err(), Some(CredentialBundleBuilderError::MissingTokenType));
	}

	#[test]
	fn unrepresentable_expiry_is_an_error() {
		let result = CredentialBundle::builder(configuration(None))
			.access_token("T")
			.token_type("Bearer")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::seconds(1_000_000_000_000_000))
			.build();

		assert_eq!(result.err(), Some(CredentialBundleBuilderError::ExpiryOutOfRange));
	}

	#[test]
	fn json_shape_matches_handoff_contract() {
		let bundle = CredentialBundle::builder(configuration(Some("s3cret")))
			.access_token("T")
			.refresh_token("R")
			.token_type("Bearer")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::seconds(3600))
			.build()
			.expect("Bundle builder should succeed.");
		let value = serde_json::to_value(&bundle).expect("Bundle should serialize.");

		assert_eq!(value["configuration"]["client_id"], "abc");
		assert_eq!(value["configuration"]["client_secret"], "s3cret");
		assert_eq!(value["configuration"]["tenant"], "common");
		assert_eq!(value["configuration"]["provider"], "microsoft");
		assert_eq!(value["configuration"]["scopes"][0], "User.Read");
		assert!(value["configuration"].get("token_endpoint").is_none());
		assert_eq!(value["token_data"]["access_token"], "T");
		assert_eq!(value["token_data"]["refresh_token"], "R");
		assert_eq!(value["token_data"]["expires_at"], "2025-01-01T01:00:00Z");
		assert_eq!(value["token_data"]["token_type"], "Bearer");
		assert_eq!(value["token_data"]["scope"][0], "User.Read");

		let back: CredentialBundle =
			serde_json::from_value(value).expect("Bundle should deserialize from its own JSON.");

		assert_eq!(back, bundle);
	}

	#[test]
	fn debug_output_redacts_tokens() {
		let bundle = CredentialBundle::builder(configuration(Some("s3cret")))
			.access_token("very-secret-access")
			.token_type("Bearer")
			.expires_in(Duration::seconds(60))
			.build()
			.expect("Bundle builder should succeed.");
		let rendered = format!("{bundle:?}");

		assert!(!rendered.contains("very-secret-access"));
		assert!(!rendered.contains("s3cret"));
	}
}
