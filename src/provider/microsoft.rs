//! Microsoft-style enterprise identity provider.
//!
//! Endpoints are templated from the authority host and tenant:
//! `{host}/{tenant}/oauth2/v2.0/{authorize,token}`. Refresh tokens are requested through
//! the reserved `offline_access openid profile` scopes, which are appended to the
//! configured scopes on the authorization URL and on the token request. The refresh
//! grant of a confidential client needs the secret, so it is embedded in the bundle.

// self
use crate::{
	_prelude::*,
	auth::{CredentialBundle, ProviderId, ScopeSet, TenantId},
	config::{ProviderConfig, property},
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

/// Public-cloud authority host.
pub const MICROSOFT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
/// Scopes the identity platform reserves for ID and refresh token issuance.
pub const MICROSOFT_RESERVED_SCOPES: [&str; 3] = ["offline_access", "openid", "profile"];

/// Reqwest-backed [`MicrosoftAdapter`].
#[cfg(feature = "reqwest")]
pub type ReqwestMicrosoftAdapter = MicrosoftAdapter<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// [`ProviderAdapter`] for Microsoft-style providers.
pub struct MicrosoftAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	error_mapper: Arc<M>,
	strategy: Arc<dyn ProviderStrategy>,
}
impl<C, M> MicrosoftAdapter<C, M>
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
	///
	/// Explicit endpoint overrides win over the templated authority.
	pub fn descriptor(&self, config: &ProviderConfig) -> Result<ProviderDescriptor> {
		let endpoints = config.endpoints();
		let host = match &endpoints.authority_host {
			Some(url) => url.clone(),
			None => Url::parse(MICROSOFT_AUTHORITY_HOST)
				.map_err(|source| ConfigError::InvalidDescriptor { source })?,
		};
		let common = TenantId::common();
		let tenant = config.tenant().unwrap_or(&common);
		let authorization = match &endpoints.authorization {
			Some(url) => url.clone(),
			None => authority_endpoint(&host, tenant, "authorize")?,
		};
		let token = match &endpoints.token {
			Some(url) => url.clone(),
			None => authority_endpoint(&host, tenant, "token")?,
		};
		let id = ProviderId::new(ProviderKind::Microsoft.as_str()).map_err(ConfigError::from)?;

		ProviderDescriptor::builder(id)
			.authorization_endpoint(authorization)
			.token_endpoint(token)
			.quirks(ProviderQuirks {
				scope_on_exchange: true,
				secret_embedding: SecretEmbedding::Embed,
				scope_delimiter: ' ',
			})
			.build()
			.map_err(|e| ConfigError::from(e).into())
	}
}
#[cfg(feature = "reqwest")]
impl ReqwestMicrosoftAdapter {
	/// Builds an adapter over a reqwest transport.
	pub fn new(http_client: ReqwestHttpClient) -> Self {
		Self::with_http_client(http_client, ReqwestTransportErrorMapper)
	}
}
impl<C, M> ProviderAdapter for MicrosoftAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn kind(&self) -> ProviderKind {
		ProviderKind::Microsoft
	}

	fn build_authorization_url(&self, request: &AuthorizationRequest) -> Result<AuthorizationUrl> {
		let config = request.config();
		let descriptor = self.descriptor(config)?;
		let state = adapter::generate_state();
		let url =
			adapter::build_authorize_url(&descriptor, config, &wire_scopes(config), &state, &[]);

		Ok(AuthorizationUrl { url, state })
	}

	fn exchange_code<'a>(&'a self, request: &'a ExchangeRequest) -> AdapterFuture<'a, CredentialBundle> {
		Box::pin(async move {
			let descriptor = self.descriptor(request.config())?;
			let scope = descriptor
				.quirks
				.scope_on_exchange
				.then(|| wire_scopes(request.config()).join(descriptor.quirks.scope_delimiter));

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
impl<C, M> Debug for MicrosoftAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("MicrosoftAdapter(..)")
	}
}

fn wire_scopes(config: &ProviderConfig) -> ScopeSet {
	config.scopes().with_appended(MICROSOFT_RESERVED_SCOPES)
}

fn authority_endpoint(host: &Url, tenant: &TenantId, leaf: &str) -> Result<Url> {
	let mut url = host.clone();

	url.set_query(None);
	url.set_fragment(None);
	url.path_segments_mut()
		.map_err(|_| ConfigError::InvalidProperty {
			property: property::AUTHORITY_HOST,
			reason: "authority host must be a hierarchical URL".into(),
		})?
		.pop_if_empty()
		.extend([tenant.as_ref(), "oauth2", "v2.0", leaf]);

	Ok(url)
}
