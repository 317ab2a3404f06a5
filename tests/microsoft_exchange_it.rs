#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_handoff::{
	_preludet::*,
	config::property,
	error::ErrorKind,
	flows::{CoordinatorSettings, Outcome},
	host::{CODE_ATTRIBUTE, MemoryProperties, WorkUnit},
	provider::{ProviderErrorKind, ProviderKind},
};

const TOKEN_PATH: &str = "/contoso/oauth2/v2.0/token";
const REDIRECT_URI: &str = "https://app.example.com/callback";

fn props(server: &MockServer) -> MemoryProperties {
	MemoryProperties::new()
		.with(property::PROVIDER, "Microsoft")
		.with(property::CLIENT_ID, "ms-client")
		.with(property::CLIENT_SECRET, "ms-secret")
		.with(property::TENANT_ID, "contoso")
		.with(property::REDIRECT_URI, REDIRECT_URI)
		.with(property::SCOPES, "User.Read, Mail.Read")
		.with(property::AUTHORITY_HOST, server.url("/"))
}

fn callback() -> WorkUnit {
	WorkUnit::new().with_attribute(CODE_ATTRIBUTE, "M.R3_BAY.code")
}

#[tokio::test]
async fn authorization_url_uses_the_tenant_authority() {
	let server = MockServer::start_async().await;
	let coordinator = build_reqwest_test_coordinator(CoordinatorSettings::default());
	let outcome = coordinator.process(&props(&server), &WorkUnit::new(), &CancellationToken::new()).await;
	let Outcome::RedirectReady { url, .. } = outcome else {
		panic!("URL generation should succeed, got {outcome:?}.");
	};
	let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

	assert_eq!(url.path(), "/contoso/oauth2/v2.0/authorize");
	assert_eq!(
		pairs.get("scope"),
		Some(&"User.Read Mail.Read offline_access openid profile".into())
	);
	assert!(!pairs.contains_key("access_type"));
}

#[tokio::test]
async fn exchange_embeds_the_secret_for_refresh() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "M.R3_BAY.code")
				.form_urlencoded_tuple("redirect_uri", REDIRECT_URI)
				.form_urlencoded_tuple("scope", "User.Read Mail.Read offline_access openid profile")
				.form_urlencoded_tuple("client_id", "ms-client")
				.form_urlencoded_tuple("client_secret", "ms-secret");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"eyJ0eXAi\",\"refresh_token\":\"M.refresh\",\"token_type\":\"Bearer\",\"expires_in\":4371,\"ext_expires_in\":4371,\"scope\":\"User.Read Mail.Read\"}",
			);
		})
		.await;
	let coordinator = build_reqwest_test_coordinator(CoordinatorSettings::default());
	let outcome = coordinator.process(&props(&server), &callback(), &CancellationToken::new()).await;

	mock.assert_async().await;

	let Outcome::Exchanged(bundle) = outcome else {
		panic!("Exchange should succeed, got {outcome:?}.");
	};

	assert_eq!(bundle.configuration.provider, ProviderKind::Microsoft);
	assert_eq!(
		bundle.configuration.client_secret.as_ref().map(|secret| secret.expose()),
		Some("ms-secret")
	);
	assert_eq!(bundle.configuration.tenant.as_ref().map(|tenant| &**tenant), Some("contoso"));
	assert_eq!(
		bundle.configuration.token_endpoint.as_ref().map(Url::path),
		Some(TOKEN_PATH)
	);
	assert_eq!(bundle.token_data.access_token.expose(), "eyJ0eXAi");
	assert!(bundle.token_data.scope.contains("Mail.Read"));
}

#[tokio::test]
async fn reused_code_reports_the_aadsts_message() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400).header("content-type", "application/json").body(
				"{\"error\":\"invalid_grant\",\"error_description\":\"AADSTS70008: The provided authorization code or refresh token has expired.\"}",
			);
		})
		.await;
	let coordinator = build_reqwest_test_coordinator(CoordinatorSettings::default());
	let outcome = coordinator.process(&props(&server), &callback(), &CancellationToken::new()).await;

	mock.assert_async().await;

	let Outcome::Failed { kind, message, reason, .. } = outcome else {
		panic!("Exchange should fail, got {outcome:?}.");
	};

	assert_eq!(kind, ErrorKind::ProviderExchange);
	assert!(message.starts_with("invalid_grant: AADSTS70008"));
	assert_eq!(reason, Some(ProviderErrorKind::InvalidGrant));
}

#[tokio::test]
async fn common_tenant_is_used_when_unset() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/common/oauth2/v2.0/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"eyJ0eXAi\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let mut props = props(&server);

	props.remove(property::TENANT_ID);

	let coordinator = build_reqwest_test_coordinator(CoordinatorSettings::default());
	let outcome = coordinator.process(&props, &callback(), &CancellationToken::new()).await;

	mock.assert_async().await;

	let Outcome::Exchanged(bundle) = outcome else {
		panic!("Exchange should succeed, got {outcome:?}.");
	};

	assert_eq!(bundle.configuration.tenant.as_ref().map(|tenant| &**tenant), Some("common"));
	assert!(bundle.token_data.refresh_token.is_none());
}
