//! Assembles a [`ProviderConfig`] from host properties for one work unit.

// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	config::{ClientSecretsFile, ProviderConfig, property},
	error::ConfigError,
	host::{PropertySource, WorkUnit},
	provider::ProviderKind,
};

/// Validates host properties and builds the per-invocation [`ProviderConfig`].
///
/// Every value goes through expression substitution first, so `${attribute}` references
/// in properties resolve against the current work unit.
#[derive(Clone, Debug, Default)]
pub struct ConfigurationResolver {
	default_provider: Option<ProviderKind>,
}
impl ConfigurationResolver {
	/// Creates a resolver that requires the `Provider` property.
	pub fn new() -> Self {
		Self::default()
	}

	/// Uses `provider` when the `Provider` property is unset.
	pub fn with_default_provider(mut self, provider: ProviderKind) -> Self {
		self.default_provider = Some(provider);

		self
	}

	/// Resolves and validates the configuration for `unit`.
	pub fn resolve(
		&self,
		props: &dyn PropertySource,
		unit: &WorkUnit,
	) -> Result<ProviderConfig, ConfigError> {
		let value = |name: &str| {
			props.evaluate(name, unit).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
		};
		let provider = match value(property::PROVIDER) {
			Some(raw) => raw.parse()?,
			None => self
				.default_provider
				.ok_or(ConfigError::MissingProperty { property: property::PROVIDER })?,
		};
		let file = match value(property::CREDENTIALS_FILE) {
			Some(_) if provider != ProviderKind::Google => {
				return Err(ConfigError::InvalidProperty {
					property: property::CREDENTIALS_FILE,
					reason: format!("not supported for provider `{provider}`"),
				});
			},
			Some(path) => Some(ClientSecretsFile::load(path)?),
			None => None,
		};
		let file = file.as_ref().map(ClientSecretsFile::secrets);
		let mut builder = ProviderConfig::builder(provider);

		if let Some(client_id) =
			value(property::CLIENT_ID).or_else(|| file.map(|f| f.client_id.clone()))
		{
			builder = builder.client_id(client_id);
		}
		if let Some(secret) =
			value(property::CLIENT_SECRET).or_else(|| file.and_then(|f| f.client_secret.clone()))
		{
			builder = builder.client_secret(secret);
		}
		if let Some(tenant) = value(property::TENANT_ID) {
			builder = builder.tenant(tenant);
		}
		if let Some(redirect) = value(property::REDIRECT_URI) {
			builder = builder.redirect_uri(redirect);
		}
		if let Some(scopes) = value(property::SCOPES) {
			builder = builder.scopes(ScopeSet::from_comma_separated(&scopes)?.as_slice().to_vec());
		}

		let authorization = value(property::AUTHORIZATION_ENDPOINT)
			.map(|raw| parse_url(property::AUTHORIZATION_ENDPOINT, &raw))
			.transpose()?
			.or_else(|| file.and_then(|f| f.auth_uri.clone()));
		let token = value(property::TOKEN_ENDPOINT)
			.map(|raw| parse_url(property::TOKEN_ENDPOINT, &raw))
			.transpose()?
			.or_else(|| file.and_then(|f| f.token_uri.clone()));

		if let Some(url) = authorization {
			builder = builder.authorization_endpoint(url);
		}
		if let Some(url) = token {
			builder = builder.token_endpoint(url);
		}
		if let Some(raw) = value(property::AUTHORITY_HOST) {
			builder = builder.authority_host(parse_url(property::AUTHORITY_HOST, &raw)?);
		}

		builder.build()
	}
}

fn parse_url(property: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|e| ConfigError::InvalidProperty { property, reason: e.to_string() })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::host::MemoryProperties;

	fn props() -> MemoryProperties {
		MemoryProperties::new()
			.with(property::PROVIDER, "microsoft")
			.with(property::CLIENT_ID, "abc")
			.with(property::CLIENT_SECRET, "s3cret")
			.with(property::REDIRECT_URI, "https://cb")
			.with(property::SCOPES, "User.Read, Mail.Read,,")
	}

	#[test]
	fn resolves_a_complete_microsoft_configuration() {
		let config = ConfigurationResolver::new()
			.resolve(&props(), &WorkUnit::new())
			.expect("Complete properties should resolve.");

		assert_eq!(config.provider(), ProviderKind::Microsoft);
		assert_eq!(config.client_id().as_ref(), "abc");
		assert_eq!(config.tenant().map(|t| t.as_ref()), Some("common"));
		assert_eq!(config.scopes().normalized(), "User.Read Mail.Read");
	}

	#[test]
	fn expressions_feed_the_tenant() {
		let props = props().with(property::TENANT_ID, "${tenant}");
		let unit = WorkUnit::new().with_attribute("tenant", "contoso");
		let config = ConfigurationResolver::new()
			.resolve(&props, &unit)
			.expect("Expression-backed tenant should resolve.");

		assert_eq!(config.tenant().map(|t| t.as_ref()), Some("contoso"));
	}

	#[test]
	fn provider_falls_back_to_default_or_fails() {
		let mut props = props();

		props.remove(property::PROVIDER);

		let err = ConfigurationResolver::new()
			.resolve(&props, &WorkUnit::new())
			.expect_err("Missing provider without default must fail.");

		assert!(matches!(err, ConfigError::MissingProperty { property: property::PROVIDER }));

		let config = ConfigurationResolver::new()
			.with_default_provider(ProviderKind::Google)
			.resolve(&props, &WorkUnit::new())
			.expect("Default provider should apply.");

		assert_eq!(config.provider(), ProviderKind::Google);
	}

	#[test]
	fn blank_scopes_are_missing() {
		let props = props().with(property::SCOPES, " , ");
		let err = ConfigurationResolver::new()
			.resolve(&props, &WorkUnit::new())
			.expect_err("Blank scopes must fail.");

		assert!(matches!(err, ConfigError::MissingProperty { property: property::SCOPES }));
	}

	#[test]
	fn credentials_file_is_google_only() {
		let props = props().with(property::CREDENTIALS_FILE, "/nonexistent.json");
		let err = ConfigurationResolver::new()
			.resolve(&props, &WorkUnit::new())
			.expect_err("Credentials file with Microsoft must fail.");

		assert!(matches!(
			err,
			ConfigError::InvalidProperty { property: property::CREDENTIALS_FILE, .. }
		));
	}
}
