//! Stateless OAuth 2.0 authorization-code coordinator.
//!
//! One inbound work unit becomes either a consent URL or a refresh-ready credential bundle,
//! for Google- and Microsoft-style providers.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod host;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{CredentialBundle, ScopeSet},
		config::ProviderConfig,
		flows::{CoordinatorSettings, FlowCoordinator},
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{
			AdapterFuture, AuthorizationRequest, AuthorizationUrl, ExchangeRequest, ProviderAdapter,
			ProviderKind, ProviderRejection, ReqwestGoogleAdapter, ReqwestMicrosoftAdapter,
			SecretEmbedding,
		},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a coordinator wired with both reqwest-backed adapters, using the insecure
	/// test transport so adapters can talk to `httpmock` servers.
	pub fn build_reqwest_test_coordinator(settings: CoordinatorSettings) -> FlowCoordinator {
		let http_client = Arc::new(test_reqwest_http_client());
		let mapper = Arc::new(ReqwestTransportErrorMapper);

		FlowCoordinator::new(settings)
			.with_adapter(Arc::new(ReqwestGoogleAdapter::with_http_client(
				http_client.clone(),
				mapper.clone(),
			)))
			.with_adapter(Arc::new(ReqwestMicrosoftAdapter::with_http_client(http_client, mapper)))
	}

	/// Scripted response returned by [`MockAdapter::exchange_code`].
	#[derive(Clone, Debug)]
	pub enum MockExchange {
		/// Succeed with the given access token and relative lifetime in seconds.
		Token {
			/// Access token handed back to the coordinator.
			access_token: String,
			/// Relative lifetime reported by the mocked provider.
			expires_in: i64,
		},
		/// Fail with a verbatim provider error message.
		Reject(String),
		/// Never complete within the given delay.
		Stall(std::time::Duration),
	}

	/// Counting adapter used to observe coordinator behavior without any network.
	#[derive(Debug)]
	pub struct MockAdapter {
		/// Provider kind this mock registers under.
		pub kind: ProviderKind,
		/// Scripted exchange behavior.
		pub exchange: MockExchange,
		/// Number of `build_authorization_url` calls.
		pub url_calls: std::sync::atomic::AtomicUsize,
		/// Number of `exchange_code` calls.
		pub exchange_calls: std::sync::atomic::AtomicUsize,
		/// Codes observed by `exchange_code`, in call order.
		pub seen_codes: Mutex<Vec<String>>,
	}
	impl MockAdapter {
		/// Creates a mock for `kind` with the scripted exchange behavior.
		pub fn new(kind: ProviderKind, exchange: MockExchange) -> Self {
			Self {
				kind,
				exchange,
				url_calls: Default::default(),
				exchange_calls: Default::default(),
				seen_codes: Default::default(),
			}
		}

		/// Total adapter invocations across both operations.
		pub fn calls(&self) -> usize {
			use std::sync::atomic::Ordering;

			self.url_calls.load(Ordering::SeqCst) + self.exchange_calls.load(Ordering::SeqCst)
		}
	}
	impl ProviderAdapter for MockAdapter {
		fn kind(&self) -> ProviderKind {
			self.kind
		}

		fn build_authorization_url(
			&self,
			request: &AuthorizationRequest,
		) -> Result<AuthorizationUrl> {
			self.url_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

			let config = request.config();
			let mut url = Url::parse("https://mock.example.com/authorize")
				.expect("Mock authorization endpoint should parse successfully.");

			url.query_pairs_mut()
				.append_pair("client_id", config.client_id())
				.append_pair("redirect_uri", config.redirect_uri().as_str())
				.append_pair("scope", &config.scopes().normalized())
				.append_pair("state", "mock-state");

			Ok(AuthorizationUrl { url, state: "mock-state".into() })
		}

		fn exchange_code<'a>(
			&'a self,
			request: &'a ExchangeRequest,
		) -> AdapterFuture<'a, CredentialBundle> {
			self.exchange_calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
			self.seen_codes.lock().push(request.code().to_owned());

			let exchange = self.exchange.clone();

			Box::pin(async move {
				match exchange {
					MockExchange::Token { access_token, expires_in } =>
						mock_bundle(request.config(), &access_token, expires_in),
					MockExchange::Reject(message) =>
						Err(ProviderRejection::new(message).into()),
					MockExchange::Stall(delay) => {
						tokio::time::sleep(delay).await;

						mock_bundle(request.config(), "late", 60)
					},
				}
			})
		}
	}

	fn mock_bundle(
		config: &ProviderConfig,
		access_token: &str,
		expires_in: i64,
	) -> Result<CredentialBundle> {
		let scope: ScopeSet = config.scopes().clone();

		CredentialBundle::builder(config.refresh_configuration(None, SecretEmbedding::Omit))
			.access_token(access_token)
			.token_type("Bearer")
			.granted_scope(scope)
			.issued_now()
			.expires_in(Duration::seconds(expires_in))
			.build()
			.map_err(|err| crate::error::ConfigError::from(err).into())
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::{Hash, Hasher},
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use tokio_util::sync::CancellationToken;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
