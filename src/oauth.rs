//! Internal OAuth client facade over the `oauth2` crate.
//!
//! Both adapters funnel their token request through [`BasicFacade`], which owns the
//! request shape (client authentication, verbatim `redirect_uri`, optional `scope`), the
//! normalization into a [`CredentialBundle`], and the mapping of every failure into the
//! crate taxonomy.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenType},
};
// self
use crate::{
	_prelude::*,
	auth::{CredentialBundle, RefreshConfiguration, ScopeSet},
	error::TransientError,
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{ProviderDescriptor, ProviderErrorContext, ProviderRejection, ProviderStrategy},
};
#[cfg(feature = "reqwest")] use crate::error::{ConfigError, TransportError};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeTokenResponse = oauth2::basic::BasicTokenResponse;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(meta, message),
			_ => map_generic_transport_error(meta, "unrecognized transport failure"),
		}
	}
}

/// Code exchange parameters that vary per dialect.
pub(crate) struct CodeExchange<'a> {
	pub(crate) code: &'a str,
	pub(crate) redirect_uri: &'a str,
	pub(crate) scope: Option<String>,
	pub(crate) configuration: RefreshConfiguration,
}

pub(crate) struct BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: Option<&str>,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Self {
		let auth_url = AuthUrl::from_url(descriptor.endpoints.authorization.clone());
		let token_url = TokenUrl::from_url(descriptor.endpoints.token.clone());
		// Both dialects expect client credentials in the form body (`client_secret_post`).
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		if let Some(secret) = client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.to_owned()));
		}

		Self { oauth_client, http_client, error_mapper }
	}

	/// Performs the single `authorization_code` round trip.
	pub(crate) fn exchange_authorization_code<'a>(
		&'a self,
		strategy: &'a dyn ProviderStrategy,
		exchange: CodeExchange<'a>,
	) -> FacadeFuture<'a, CredentialBundle> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			// `redirect_uri` is sent as an extra parameter so the configured string reaches
			// the provider without URL normalization.
			let mut request = self
				.oauth_client
				.exchange_code(AuthorizationCode::new(exchange.code.to_owned()))
				.add_extra_param("redirect_uri", exchange.redirect_uri.to_owned());

			if let Some(scope) = exchange.scope.as_ref() {
				request = request.add_extra_param("scope", scope.clone());
			}

			let mut extra = BTreeMap::new();

			strategy.augment_token_request(&mut extra);

			for (key, value) in extra {
				request = request.add_extra_param(key, value);
			}

			let received_at = OffsetDateTime::now_utc();
			let response = request.request_async(&instrumented).await.map_err(|err| {
				map_request_error(strategy, meta.take(), err, self.error_mapper.as_ref())
			})?;

			map_code_response(exchange.configuration, received_at, response)
		})
	}
}

fn map_code_response(
	configuration: RefreshConfiguration,
	received_at: OffsetDateTime,
	response: FacadeTokenResponse,
) -> Result<CredentialBundle> {
	let expires_in = response
		.expires_in()
		.ok_or_else(|| ProviderRejection::malformed_response("token response lacks expires_in"))?
		.as_secs();
	let expires_in = i64::try_from(expires_in)
		.ok()
		.filter(|secs| *secs > 0)
		.ok_or_else(|| ProviderRejection::malformed_response("expires_in must be positive"))?;
	let granted = match response.scopes() {
		Some(scopes) => ScopeSet::new(scopes.iter().map(|scope| scope.as_ref()))
			.map_err(|e| ProviderRejection::malformed_response(e.to_string()))?,
		None => configuration.scopes.clone(),
	};
	let mut builder = CredentialBundle::builder(configuration)
		.access_token(response.access_token().secret().to_owned())
		.token_type(token_type_label(response.token_type()))
		.granted_scope(granted)
		.issued_at(received_at)
		.expires_in(Duration::seconds(expires_in));

	if let Some(refresh) = response.refresh_token() {
		builder = builder.refresh_token(refresh.secret().to_owned());
	}

	builder.build().map_err(|e| ProviderRejection::malformed_response(e.to_string()).into())
}

fn token_type_label(token_type: &BasicTokenType) -> String {
	match token_type {
		BasicTokenType::Bearer => "Bearer".into(),
		BasicTokenType::Mac => "MAC".into(),
		BasicTokenType::Extension(other) => other.clone(),
	}
}

fn map_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(strategy, response, meta_ref),
		RequestTokenError::Request(error) => mapper.map_transport_error(meta_ref, error),
		RequestTokenError::Parse(error, body) => map_parse_error(meta_ref, error, &body),
		RequestTokenError::Other(message) => TransientError::TokenEndpoint {
			message,
			status: meta_status(meta_ref),
			retry_after: meta_retry_after(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(
	strategy: &dyn ProviderStrategy,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let code = response.error().as_ref().to_owned();
	let mut ctx = ProviderErrorContext::default().with_oauth_error(code.clone());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = meta_status(meta) {
		ctx = ctx.with_http_status(status);
	}

	let mut rejection = ProviderRejection::new(code)
		.with_kind(strategy.classify_token_error(&ctx))
		.with_status(meta_status(meta));

	if let Some(description) = response.error_description() {
		rejection = rejection.with_description(description.clone());
	}

	rejection.into()
}

// A body that is neither a token nor an OAuth error document: gateways and load
// balancers answer 5xx with HTML, which is a network condition, anything else is the
// provider misbehaving.
fn map_parse_error(
	meta: Option<&ResponseMetadata>,
	error: serde_path_to_error::Error<serde_json::Error>,
	body: &[u8],
) -> Error {
	let status = meta_status(meta);

	if status.is_some_and(|code| code >= 500) {
		let preview = ProviderErrorContext::default()
			.with_body_preview(String::from_utf8_lossy(body))
			.body_preview
			.unwrap_or_default();

		return TransientError::TokenEndpoint {
			message: preview,
			status,
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransientError::TokenResponseParse { source: error, status }.into()
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return Error::Timeout { after: None };
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(meta: Option<&ResponseMetadata>, message: impl Display) -> Error {
	TransientError::TokenEndpoint {
		message: format!("HTTP client error: {message}"),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::{AccessToken, EmptyExtraTokenFields, RefreshToken, Scope, StandardTokenResponse};
	// self
	use super::*;
	use crate::provider::ProviderKind;

	fn configuration() -> RefreshConfiguration {
		RefreshConfiguration {
			provider: ProviderKind::Google,
			client_id: crate::auth::ClientId::new("abc").expect("Client fixture should be valid."),
			client_secret: None,
			tenant: None,
			scopes: ScopeSet::new(["read", "write"]).expect("Scope fixture should be valid."),
			token_endpoint: None,
		}
	}

	fn response(expires_in: Option<u64>) -> FacadeTokenResponse {
		let mut response = StandardTokenResponse::new(
			AccessToken::new("T".into()),
			BasicTokenType::Bearer,
			EmptyExtraTokenFields {},
		);

		response.set_expires_in(expires_in.map(std::time::Duration::from_secs).as_ref());

		response
	}

	#[test]
	fn expiry_is_anchored_at_receipt_time() {
		let received_at = OffsetDateTime::now_utc();
		let bundle = map_code_response(configuration(), received_at, response(Some(3600)))
			.expect("Token response should normalize.");

		assert_eq!(bundle.token_data.expires_at, received_at + Duration::seconds(3600));
		assert_eq!(bundle.token_data.token_type, "Bearer");
		assert_eq!(bundle.token_data.scope, bundle.configuration.scopes);
		assert!(bundle.token_data.refresh_token.is_none());
	}

	#[test]
	fn granted_scopes_and_refresh_token_come_from_the_response() {
		let mut response = response(Some(60));

		response.set_refresh_token(Some(RefreshToken::new("R".into())));
		response.set_scopes(Some(vec![Scope::new("read".into())]));

		let bundle = map_code_response(configuration(), OffsetDateTime::now_utc(), response)
			.expect("Token response should normalize.");

		assert_eq!(bundle.token_data.scope.normalized(), "read");
		assert_eq!(
			bundle.token_data.refresh_token.as_ref().map(|secret| secret.expose()),
			Some("R")
		);
	}

	#[test]
	fn missing_or_zero_expiry_never_yields_a_bundle() {
		for expires_in in [None, Some(0)] {
			let err = map_code_response(configuration(), OffsetDateTime::now_utc(), response(expires_in))
				.expect_err("Unusable expiry must be rejected.");

			assert!(matches!(err, Error::Provider(_)), "Unexpected error: {err:?}.");
		}
	}

	#[test]
	fn huge_expiry_is_rejected_instead_of_overflowing() {
		for expires_in in [1_000_000_000_000_000, u64::MAX] {
			let err =
				map_code_response(configuration(), OffsetDateTime::now_utc(), response(Some(expires_in)))
					.expect_err("Unrepresentable expiry must be rejected.");

			assert_eq!(err.kind(), crate::error::ErrorKind::ProviderExchange);
		}
	}

	#[test]
	fn extension_token_types_pass_through() {
		assert_eq!(token_type_label(&BasicTokenType::Extension("pop".into())), "pop");
		assert_eq!(token_type_label(&BasicTokenType::Mac), "MAC");
	}
}
