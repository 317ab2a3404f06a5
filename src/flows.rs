//! The flow coordinator: mode selection, state checks, and outcome translation.
//!
//! Each call to [`FlowCoordinator::process`] resolves configuration for the work unit,
//! picks [`FlowMode::GenerateUrl`] or [`FlowMode::ExchangeCode`] from the presence of the
//! code attribute, drives the provider adapter, and folds every result into an
//! [`Outcome`]. Nothing survives between invocations; there are no retries.

pub mod mode;
pub mod outcome;
pub mod settings;
pub mod state;

pub use mode::*;
pub use outcome::*;
pub use settings::*;
pub use state::*;

// self
use crate::{
	_prelude::*,
	auth::CredentialBundle,
	config::ConfigurationResolver,
	error::ConfigError,
	host::{FlowOutput, PropertySource, WorkUnit},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{
		AuthorizationRequest, AuthorizationUrl, ExchangeRequest, ProviderAdapter, ProviderKind,
	},
};
#[cfg(feature = "reqwest")]
use crate::{
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::{ReqwestGoogleAdapter, ReqwestMicrosoftAdapter},
};

/// Stateless dual-mode authorization code coordinator.
///
/// Holds one adapter per provider kind, the configuration resolver, and the settings.
/// It is `Send + Sync` and can be shared freely across concurrent invocations.
#[derive(Clone)]
pub struct FlowCoordinator {
	settings: CoordinatorSettings,
	resolver: ConfigurationResolver,
	adapters: BTreeMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}
impl FlowCoordinator {
	/// Creates a coordinator with no adapters registered.
	pub fn new(settings: CoordinatorSettings) -> Self {
		Self { settings, resolver: ConfigurationResolver::default(), adapters: BTreeMap::new() }
	}

	/// Registers `adapter` for its provider kind, replacing any previous one.
	pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
		self.adapters.insert(adapter.kind(), adapter);

		self
	}

	/// Replaces the configuration resolver.
	pub fn with_resolver(mut self, resolver: ConfigurationResolver) -> Self {
		self.resolver = resolver;

		self
	}

	/// Coordinator settings.
	pub fn settings(&self) -> &CoordinatorSettings {
		&self.settings
	}

	/// Runs one invocation and returns its [`Outcome`].
	///
	/// Cancelling `cancel` while the exchange is in flight yields
	/// [`ErrorKind::Cancelled`](crate::error::ErrorKind::Cancelled).
	pub async fn process(
		&self,
		props: &dyn PropertySource,
		unit: &WorkUnit,
		cancel: &CancellationToken,
	) -> Outcome {
		let (kind, stage) = match FlowMode::select(unit, &self.settings.code_attribute) {
			FlowMode::GenerateUrl => (FlowKind::AuthorizationUrl, "build_authorization_url"),
			FlowMode::ExchangeCode => (FlowKind::CodeExchange, "exchange_code"),
		};
		let span = FlowSpan::new(kind, stage);

		obs::record_flow_outcome(kind, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				match kind {
					FlowKind::AuthorizationUrl =>
						self.authorization_url(props, unit).map(|AuthorizationUrl { url, state }| {
							Outcome::RedirectReady { url, state }
						}),
					FlowKind::CodeExchange =>
						self.code_exchange(props, unit, cancel).await.map(Outcome::Exchanged),
				}
			})
			.await;

		match result {
			Ok(outcome) => {
				obs::record_flow_outcome(kind, FlowOutcome::Success);

				outcome
			},
			Err(e) => {
				let outcome = Outcome::failed(&e);

				obs::record_flow_outcome(kind, FlowOutcome::Failure);
				obs::log_flow_failure(kind, e.kind(), &e.to_string());

				outcome
			},
		}
	}

	/// Runs one invocation and translates the outcome for the host.
	pub async fn handle(
		&self,
		props: &dyn PropertySource,
		unit: &WorkUnit,
		cancel: &CancellationToken,
	) -> FlowOutput {
		self.process(props, unit, cancel).await.into_output()
	}

	fn adapter(&self, kind: ProviderKind) -> Result<&Arc<dyn ProviderAdapter>, ConfigError> {
		self.adapters
			.get(&kind)
			.ok_or(ConfigError::AdapterNotRegistered { provider: kind.as_str() })
	}

	fn authorization_url(
		&self,
		props: &dyn PropertySource,
		unit: &WorkUnit,
	) -> Result<AuthorizationUrl> {
		let config = self.resolver.resolve(props, unit)?;
		let adapter = self.adapter(config.provider())?;

		adapter.build_authorization_url(&AuthorizationRequest::new(config))
	}

	async fn code_exchange(
		&self,
		props: &dyn PropertySource,
		unit: &WorkUnit,
		cancel: &CancellationToken,
	) -> Result<CredentialBundle> {
		let config = self.resolver.resolve(props, unit)?;
		let adapter = self.adapter(config.provider())?;
		let code = unit
			.non_empty_attribute(&self.settings.code_attribute)
			.ok_or(ConfigError::MissingProperty { property: "authorization code" })?;
		let returned = unit.non_empty_attribute(&self.settings.state_attribute);
		let expected = unit.non_empty_attribute(&self.settings.expected_state_attribute);

		if self.settings.state_validation.check(returned, expected)? == StateCheck::Unverified {
			obs::log_unverified_state();
		}

		let mut request = ExchangeRequest::new(config, code);

		if let Some(state) = returned {
			request = request.with_state(state);
		}

		let bound = self.settings.exchange_timeout();

		tokio::select! {
			biased;
			_ = cancel.cancelled() => Err(Error::Cancelled),
			result = tokio::time::timeout(bound, adapter.exchange_code(&request)) => match result {
				Ok(result) => result,
				Err(_) => Err(Error::Timeout { after: Duration::try_from(bound).ok() }),
			},
		}
	}
}
#[cfg(feature = "reqwest")]
impl FlowCoordinator {
	/// Creates a coordinator with both built-in adapters over one reqwest transport.
	///
	/// The transport's own timeout matches the exchange bound.
	pub fn reqwest(settings: CoordinatorSettings) -> Result<Self, ConfigError> {
		let http_client = Arc::new(ReqwestHttpClient::new(settings.exchange_timeout())?);
		let mapper = Arc::new(ReqwestTransportErrorMapper);

		Ok(Self::new(settings)
			.with_adapter(Arc::new(ReqwestGoogleAdapter::with_http_client(
				Arc::clone(&http_client),
				Arc::clone(&mapper),
			)))
			.with_adapter(Arc::new(ReqwestMicrosoftAdapter::with_http_client(http_client, mapper))))
	}
}
impl Debug for FlowCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FlowCoordinator")
			.field("settings", &self.settings)
			.field("resolver", &self.resolver)
			.field("providers", &self.adapters.keys().collect::<Vec<_>>())
			.finish()
	}
}
