//! Google-style consumer identity provider.
//!
//! Endpoints are fixed unless overridden (for instance by a client secrets document).
//! Google only issues a refresh token on the first consent unless the authorization URL
//! asks for `access_type=offline` together with `prompt=consent`, so both are always sent.
//! The client secret stays out of the credential bundle.

// self
use crate::{
	_prelude::*,
	auth::{CredentialBundle, ProviderId},
	config::ProviderConfig,
	error::ConfigError,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	provider::{
		AdapterFuture, AuthorizationRequest, AuthorizationUrl, DefaultProviderStrategy,
		ExchangeRequest, ProviderAdapter, ProviderDescriptor, ProviderKind, ProviderQuirks,
		ProviderStrategy, SecretEmbedding, adapter,
	},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Default authorization endpoint.
pub const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
/// Default token endpoint.
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

const AUTHORIZATION_PARAMS: [(&str, &str); 3] =
	[("access_type", "offline"), ("include_granted_scopes", "true"), ("prompt", "consent")];

/// Reqwest-backed [`GoogleAdapter`].
#[cfg(feature = "reqwest")]
pub type ReqwestGoogleAdapter = GoogleAdapter<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// [`ProviderAdapter`] for Google-style providers.
pub struct GoogleAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	error_mapper: Arc<M>,
	strategy: Arc<dyn ProviderStrategy>,
}
impl<C, M> GoogleAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds an adapter over a custom transport and error mapper.
	pub fn with_http_client(http_client: impl Into<Arc<C>>, error_mapper: impl Into<Arc<M>>) -> Self {
		Self {
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
			strategy: Arc::new(DefaultProviderStrategy),
		}
	}

	/// Replaces the error classification strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Derives the validated descriptor for `config`.
	pub fn descriptor(&self, config: &ProviderConfig) -> Result<ProviderDescriptor> {
		let endpoints = config.endpoints();
		let authorization = match &endpoints.authorization {
			Some(url) => url.clone(),
			None => parse_builtin(GOOGLE_AUTHORIZATION_ENDPOINT)?,
		};
		let token = match &endpoints.token {
			Some(url) => url.clone(),
			None => parse_builtin(GOOGLE_TOKEN_ENDPOINT)?,
		};
		let id = ProviderId::new(ProviderKind::Google.as_str()).map_err(ConfigError::from)?;

		ProviderDescriptor::builder(id)
			.authorization_endpoint(authorization)
			.token_endpoint(token)
			.quirks(ProviderQuirks {
				scope_on_exchange: false,
				secret_embedding: SecretEmbedding::Omit,
				scope_delimiter: ' ',
			})
			.build()
			.map_err(|e| ConfigError::from(e).into())
	}
}
#[cfg(feature = "reqwest")]
impl ReqwestGoogleAdapter {
	/// Builds an adapter over a reqwest transport.
	pub fn new(http_client: ReqwestHttpClient) -> Self {
		Self::with_http_client(http_client, ReqwestTransportErrorMapper)
	}
}
impl<C, M> ProviderAdapter for GoogleAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn kind(&self) -> ProviderKind {
		ProviderKind::Google
	}

	fn build_authorization_url(&self, request: &AuthorizationRequest) -> Result<AuthorizationUrl> {
		let config = request.config();
		let descriptor = self.descriptor(config)?;
		let state = adapter::generate_state();
		let url = adapter::build_authorize_url(
			&descriptor,
			config,
			config.scopes(),
			&state,
			&AUTHORIZATION_PARAMS,
		);

		Ok(AuthorizationUrl { url, state })
	}

	fn exchange_code<'a>(&'a self, request: &'a ExchangeRequest) -> AdapterFuture<'a, CredentialBundle> {
		Box::pin(async move {
			let descriptor = self.descriptor(request.config())?;
			let scope = descriptor
				.quirks
				.scope_on_exchange
				.then(|| request.config().scopes().join(descriptor.quirks.scope_delimiter));

			adapter::redeem_code(
				&self.http_client,
				&self.error_mapper,
				self.strategy.as_ref(),
				descriptor,
				request,
				scope,
			)
			.await
		})
	}
}
impl<C, M> Debug for GoogleAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("GoogleAdapter(..)")
	}
}

fn parse_builtin(raw: &str) -> Result<Url> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidDescriptor { source }.into())
}
