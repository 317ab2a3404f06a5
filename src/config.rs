//! Per-invocation provider configuration.
//!
//! [`ProviderConfig`] is rebuilt for every work unit from the host's properties through
//! [`ConfigurationResolver`]. It is immutable once built; everything downstream reads it
//! through accessors.

pub mod credentials_file;
pub mod resolver;

pub use credentials_file::*;
pub use resolver::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientId, RefreshConfiguration, ScopeSet, Secret, TenantId},
	error::ConfigError,
	provider::{ProviderKind, SecretEmbedding},
};

/// Host property names read by [`ConfigurationResolver`].
pub mod property {
	/// Provider selector (`google` or `microsoft`).
	pub const PROVIDER: &str = "Provider";
	/// OAuth client identifier.
	pub const CLIENT_ID: &str = "Client ID";
	/// OAuth client secret.
	pub const CLIENT_SECRET: &str = "Client Secret";
	/// Directory tenant for Microsoft-style providers.
	pub const TENANT_ID: &str = "Tenant ID";
	/// Redirect target registered with the provider.
	pub const REDIRECT_URI: &str = "Redirect URI";
	/// Comma-separated scope list.
	pub const SCOPES: &str = "Scopes";
	/// Path of a Google client secrets document.
	pub const CREDENTIALS_FILE: &str = "Credentials File";
	/// Authorization endpoint override.
	pub const AUTHORIZATION_ENDPOINT: &str = "Authorization Endpoint";
	/// Token endpoint override.
	pub const TOKEN_ENDPOINT: &str = "Token Endpoint";
	/// Microsoft authority host override.
	pub const AUTHORITY_HOST: &str = "Authority Host";
}

/// Redirect target kept byte-for-byte as configured.
///
/// Token endpoints compare `redirect_uri` as an exact string, so the raw value is what
/// goes on the wire. Parsing only guarantees it is an absolute URI.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RedirectTarget(String);
impl RedirectTarget {
	/// Validates and wraps a redirect target.
	pub fn parse(raw: impl Into<String>) -> Result<Self, ConfigError> {
		let raw = raw.into();

		Url::parse(&raw).map_err(|source| ConfigError::InvalidRedirect { value: raw.clone(), source })?;

		Ok(Self(raw))
	}

	/// Returns the redirect target exactly as configured.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl TryFrom<String> for RedirectTarget {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(value)
	}
}
impl From<RedirectTarget> for String {
	fn from(value: RedirectTarget) -> Self {
		value.0
	}
}
impl Debug for RedirectTarget {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "RedirectTarget({})", self.0)
	}
}
impl Display for RedirectTarget {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Optional endpoint overrides for sovereign clouds, credentials files, and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointOverrides {
	/// Replaces the provider's authorization endpoint.
	pub authorization: Option<Url>,
	/// Replaces the provider's token endpoint.
	pub token: Option<Url>,
	/// Replaces the Microsoft authority host the tenant path is appended to.
	pub authority_host: Option<Url>,
}

/// Immutable provider configuration for one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
	provider: ProviderKind,
	client_id: ClientId,
	client_secret: Option<Secret>,
	tenant: Option<TenantId>,
	redirect_uri: RedirectTarget,
	scopes: ScopeSet,
	endpoints: EndpointOverrides,
}
impl ProviderConfig {
	/// Starts a builder for the given provider.
	pub fn builder(provider: ProviderKind) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(provider)
	}

	/// Selected provider dialect.
	pub fn provider(&self) -> ProviderKind {
		self.provider
	}

	/// OAuth client identifier.
	pub fn client_id(&self) -> &ClientId {
		&self.client_id
	}

	/// OAuth client secret, if configured.
	pub fn client_secret(&self) -> Option<&Secret> {
		self.client_secret.as_ref()
	}

	/// Tenant; always present for multi-tenant providers and absent otherwise.
	pub fn tenant(&self) -> Option<&TenantId> {
		self.tenant.as_ref()
	}

	/// Redirect target registered with the provider.
	pub fn redirect_uri(&self) -> &RedirectTarget {
		&self.redirect_uri
	}

	/// Scopes requested by the operator.
	pub fn scopes(&self) -> &ScopeSet {
		&self.scopes
	}

	/// Endpoint overrides.
	pub fn endpoints(&self) -> &EndpointOverrides {
		&self.endpoints
	}

	/// Projects the fields a later refresh needs.
	pub fn refresh_configuration(
		&self,
		token_endpoint: Option<Url>,
		secret: SecretEmbedding,
	) -> RefreshConfiguration {
		RefreshConfiguration {
			provider: self.provider,
			client_id: self.client_id.clone(),
			client_secret: match secret {
				SecretEmbedding::Embed => self.client_secret.clone(),
				SecretEmbedding::Omit => None,
			},
			tenant: self.tenant.clone(),
			scopes: self.scopes.clone(),
			token_endpoint,
		}
	}
}

/// Builder for [`ProviderConfig`]; [`build`](Self::build) enforces required fields.
///
/// Values are accepted as raw strings so blank host properties and missing ones are
/// reported the same way.
#[derive(Clone, Debug)]
pub struct ProviderConfigBuilder {
	provider: ProviderKind,
	client_id: Option<String>,
	client_secret: Option<String>,
	tenant: Option<String>,
	redirect_uri: Option<String>,
	scopes: Vec<String>,
	endpoints: EndpointOverrides,
}
impl ProviderConfigBuilder {
	fn new(provider: ProviderKind) -> Self {
		Self {
			provider,
			client_id: None,
			client_secret: None,
			tenant: None,
			redirect_uri: None,
			scopes: Vec::new(),
			endpoints: EndpointOverrides::default(),
		}
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, value: impl Into<String>) -> Self {
		self.client_secret = Some(value.into());

		self
	}

	/// Sets the tenant; ignored for providers without tenancy.
	pub fn tenant(mut self, value: impl Into<String>) -> Self {
		self.tenant = Some(value.into());

		self
	}

	/// Sets the redirect target.
	pub fn redirect_uri(mut self, value: impl Into<String>) -> Self {
		self.redirect_uri = Some(value.into());

		self
	}

	/// Appends requested scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Overrides the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.endpoints.authorization = Some(url);

		self
	}

	/// Overrides the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.endpoints.token = Some(url);

		self
	}

	/// Overrides the Microsoft authority host.
	pub fn authority_host(mut self, url: Url) -> Self {
		self.endpoints.authority_host = Some(url);

		self
	}

	/// Validates the collected values.
	pub fn build(self) -> Result<ProviderConfig, ConfigError> {
		let client_id = required(self.client_id, property::CLIENT_ID)?;
		let client_id = ClientId::new(client_id)?;
		let redirect_uri = RedirectTarget::parse(required(self.redirect_uri, property::REDIRECT_URI)?)?;
		let scopes = ScopeSet::new(self.scopes)?;

		if scopes.is_empty() {
			return Err(ConfigError::MissingProperty { property: property::SCOPES });
		}

		let client_secret = match non_blank(self.client_secret) {
			Some(secret) => Some(Secret::new(secret)),
			None if self.provider.requires_client_secret() =>
				return Err(ConfigError::MissingProperty { property: property::CLIENT_SECRET }),
			None => None,
		};
		let tenant = if self.provider.supports_tenancy() {
			Some(match non_blank(self.tenant) {
				Some(raw) => TenantId::new(raw)?,
				None => TenantId::common(),
			})
		} else {
			None
		};

		Ok(ProviderConfig {
			provider: self.provider,
			client_id,
			client_secret,
			tenant,
			redirect_uri,
			scopes,
			endpoints: self.endpoints,
		})
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn required(value: Option<String>, property: &'static str) -> Result<String, ConfigError> {
	non_blank(value).ok_or(ConfigError::MissingProperty { property })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base(provider: ProviderKind) -> ProviderConfigBuilder {
		ProviderConfig::builder(provider)
			.client_id("abc")
			.client_secret("s3cret")
			.redirect_uri("https://cb")
			.scopes(["read", "write"])
	}

	#[test]
	fn required_fields_are_enforced() {
		let err = ProviderConfig::builder(ProviderKind::Google)
			.client_id("abc")
			.scopes(["read"])
			.build()
			.expect_err("Missing redirect must fail.");

		assert!(matches!(err, ConfigError::MissingProperty { property: property::REDIRECT_URI }));

		let err = ProviderConfig::builder(ProviderKind::Google)
			.client_id("  ")
			.redirect_uri("https://cb")
			.scopes(["read"])
			.build()
			.expect_err("Blank client identifier must fail.");

		assert!(matches!(err, ConfigError::MissingProperty { property: property::CLIENT_ID }));

		let err = ProviderConfig::builder(ProviderKind::Google)
			.client_id("abc")
			.redirect_uri("https://cb")
			.build()
			.expect_err("Empty scope list must fail.");

		assert!(matches!(err, ConfigError::MissingProperty { property: property::SCOPES }));
	}

	#[test]
	fn secret_is_required_only_for_microsoft() {
		let err = ProviderConfig::builder(ProviderKind::Microsoft)
			.client_id("abc")
			.client_secret("   ")
			.redirect_uri("https://cb")
			.scopes(["User.Read"])
			.build()
			.expect_err("Microsoft without a secret must fail.");

		assert!(matches!(err, ConfigError::MissingProperty { property: property::CLIENT_SECRET }));

		let google = ProviderConfig::builder(ProviderKind::Google)
			.client_id("abc")
			.redirect_uri("https://cb")
			.scopes(["read"])
			.build()
			.expect("Google without a secret should build.");

		assert!(google.client_secret().is_none());
	}

	#[test]
	fn relative_redirects_are_rejected() {
		let err = ProviderConfig::builder(ProviderKind::Google)
			.client_id("abc")
			.redirect_uri("/callback")
			.scopes(["read"])
			.build()
			.expect_err("Relative redirect must fail.");

		assert!(matches!(err, ConfigError::InvalidRedirect { .. }));
	}

	#[test]
	fn redirect_is_kept_verbatim() {
		let config = base(ProviderKind::Google)
			.redirect_uri("https://cb")
			.build()
			.expect("Config should build.");

		assert_eq!(config.redirect_uri().as_str(), "https://cb");
	}

	#[test]
	fn tenant_defaults_only_for_multi_tenant_providers() {
		let microsoft = base(ProviderKind::Microsoft).build().expect("Config should build.");

		assert_eq!(microsoft.tenant().map(|t| t.as_ref()), Some("common"));

		let google = base(ProviderKind::Google).tenant("contoso").build().expect("Config should build.");

		assert!(google.tenant().is_none());
	}

	#[test]
	fn refresh_configuration_honors_secret_embedding() {
		let config = base(ProviderKind::Microsoft).tenant("contoso").build().expect("Config should build.");
		let omitted = config.refresh_configuration(None, SecretEmbedding::Omit);
		let embedded = config.refresh_configuration(None, SecretEmbedding::Embed);

		assert!(omitted.client_secret.is_none());
		assert_eq!(embedded.client_secret.as_ref().map(Secret::expose), Some("s3cret"));
		assert_eq!(embedded.tenant.as_ref().map(|t| t.as_ref()), Some("contoso"));
	}
}
