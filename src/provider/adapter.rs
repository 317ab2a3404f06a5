//! Capability trait implemented once per identity provider.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
// self
use crate::{
	_prelude::*,
	auth::{CredentialBundle, ScopeSet},
	config::ProviderConfig,
	http::TokenHttpClient,
	oauth::{BasicFacade, CodeExchange, TransportErrorMapper},
	provider::{ProviderDescriptor, ProviderKind, ProviderStrategy},
};

/// Boxed future returned by [`ProviderAdapter::exchange_code`].
pub type AdapterFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

const STATE_BYTES: usize = 24;

/// Provider dialect: authorization URL synthesis plus the code exchange.
///
/// Adapters are long-lived and stateless; every call receives the per-invocation
/// configuration inside its request.
pub trait ProviderAdapter: Send + Sync {
	/// Provider this adapter speaks for.
	fn kind(&self) -> ProviderKind;

	/// Builds the URL the user agent must visit. Never touches the network.
	fn build_authorization_url(&self, request: &AuthorizationRequest) -> Result<AuthorizationUrl>;

	/// Redeems the authorization code with exactly one token endpoint round trip.
	fn exchange_code<'a>(&'a self, request: &'a ExchangeRequest) -> AdapterFuture<'a, CredentialBundle>;
}

/// Input of [`ProviderAdapter::build_authorization_url`].
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
	config: ProviderConfig,
}
impl AuthorizationRequest {
	/// Wraps the resolved configuration.
	pub fn new(config: ProviderConfig) -> Self {
		Self { config }
	}

	/// Resolved configuration.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}
}

/// Input of [`ProviderAdapter::exchange_code`].
#[derive(Clone)]
pub struct ExchangeRequest {
	config: ProviderConfig,
	code: String,
	state: Option<String>,
}
impl ExchangeRequest {
	/// Pairs the configuration with the code taken from the callback.
	pub fn new(config: ProviderConfig, code: impl Into<String>) -> Self {
		Self { config, code: code.into(), state: None }
	}

	/// Records the `state` value the callback carried.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Resolved configuration.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Authorization code; single use.
	pub fn code(&self) -> &str {
		&self.code
	}

	/// Returned `state`, if the callback carried one.
	pub fn state(&self) -> Option<&str> {
		self.state.as_deref()
	}
}
impl Debug for ExchangeRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ExchangeRequest")
			.field("config", &self.config)
			.field("code", &"<redacted>")
			.field("state", &self.state)
			.finish()
	}
}

/// Authorization URL together with the state embedded in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationUrl {
	/// URL to send the user agent to.
	pub url: Url,
	/// Opaque anti-forgery value embedded as `state`.
	pub state: String,
}

/// Generates an unguessable `state` value (24 random bytes, base64url without padding).
pub fn generate_state() -> String {
	let mut bytes = [0_u8; STATE_BYTES];

	rand::rng().fill_bytes(&mut bytes);

	URL_SAFE_NO_PAD.encode(bytes)
}

/// Appends the standard authorization code parameters plus `extra` to the descriptor's
/// authorization endpoint.
pub(crate) fn build_authorize_url(
	descriptor: &ProviderDescriptor,
	config: &ProviderConfig,
	scope: &ScopeSet,
	state: &str,
	extra: &[(&str, &str)],
) -> Url {
	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", config.client_id());
	pairs.append_pair("redirect_uri", config.redirect_uri().as_str());

	if !scope.is_empty() {
		pairs.append_pair("scope", &scope.join(descriptor.quirks.scope_delimiter));
	}

	pairs.append_pair("state", state);

	for (key, value) in extra {
		pairs.append_pair(key, value);
	}

	drop(pairs);

	url
}

/// Runs the code exchange against `descriptor` through the shared facade.
pub(crate) async fn redeem_code<C, M>(
	http_client: &Arc<C>,
	error_mapper: &Arc<M>,
	strategy: &dyn ProviderStrategy,
	descriptor: ProviderDescriptor,
	request: &ExchangeRequest,
	scope: Option<String>,
) -> Result<CredentialBundle>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let config = request.config();
	let facade = BasicFacade::from_descriptor(
		&descriptor,
		config.client_id(),
		config.client_secret().map(|secret| secret.expose()),
		Arc::clone(http_client),
		Arc::clone(error_mapper),
	);
	let exchange = CodeExchange {
		code: request.code(),
		redirect_uri: config.redirect_uri().as_str(),
		scope,
		configuration: config.refresh_configuration(
			Some(descriptor.endpoints.token.clone()),
			descriptor.quirks.secret_embedding,
		),
	};

	facade.exchange_authorization_code(strategy, exchange).await
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn state_is_32_url_safe_characters() {
		let state = generate_state();

		assert_eq!(state.len(), 32);
		assert!(state.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
		assert_ne!(state, generate_state());
	}

	#[test]
	fn exchange_request_debug_hides_the_code() {
		let config = ProviderConfig::builder(ProviderKind::Google)
			.client_id("abc")
			.redirect_uri("https://cb")
			.scopes(["read"])
			.build()
			.expect("Config fixture should build.");
		let request = ExchangeRequest::new(config, "xyz123").with_state("s");

		assert!(!format!("{request:?}").contains("xyz123"));
		assert_eq!(request.state(), Some("s"));
	}
}
