//! Coordinator error types shared across flows, providers, and configuration.

// self
use crate::{
	_prelude::*,
	provider::{ProviderErrorKind, ProviderRejection},
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; only operator reconfiguration fixes it.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Provider rejected the exchange; the message is the provider's own.
	#[error(transparent)]
	Provider(#[from] ProviderRejection),
	/// Temporary upstream failure; left to the caller's redelivery policy.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token endpoint did not answer in time.
	#[error("Token endpoint did not respond within the exchange timeout.")]
	Timeout {
		/// Configured bound, when the coordinator (not the transport) fired it.
		after: Option<Duration>,
	},
	/// Returned `state` does not match the value issued with the authorization URL.
	#[error("Authorization state mismatch: {reason}.")]
	StateMismatch {
		/// What was missing or different.
		reason: &'static str,
	},
	/// Caller cancelled the invocation before it completed.
	#[error("Invocation was cancelled before the token exchange completed.")]
	Cancelled,
}
impl Error {
	/// Returns the terminal error category reported in [`crate::flows::Outcome::Failed`].
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Config(_) => ErrorKind::Configuration,
			Self::Provider(_) => ErrorKind::ProviderExchange,
			Self::Transient(TransientError::TokenResponseParse { .. }) =>
				ErrorKind::ProviderExchange,
			Self::Transient(TransientError::TokenEndpoint { .. }) | Self::Transport(_) =>
				ErrorKind::Network,
			Self::Timeout { .. } => ErrorKind::NetworkTimeout,
			Self::StateMismatch { .. } => ErrorKind::StateMismatch,
			Self::Cancelled => ErrorKind::Cancelled,
		}
	}

	/// Classified reason when the provider rejected the exchange.
	pub fn provider_reason(&self) -> Option<ProviderErrorKind> {
		match self {
			Self::Provider(rejection) => Some(rejection.kind),
			_ => None,
		}
	}

	/// Upstream Retry-After hint sent along with a transient token endpoint failure.
	pub fn retry_after(&self) -> Option<Duration> {
		match self {
			Self::Transient(TransientError::TokenEndpoint { retry_after, .. }) => *retry_after,
			_ => None,
		}
	}
}

/// Terminal failure categories; none of them is retried inside the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	/// Missing or invalid configuration.
	Configuration,
	/// Provider rejected the code, redirect, or client credentials.
	ProviderExchange,
	/// Token endpoint call exceeded its time bound.
	NetworkTimeout,
	/// Network or transient upstream failure.
	Network,
	/// Returned authorization state failed validation.
	StateMismatch,
	/// Caller aborted the invocation.
	Cancelled,
}
impl ErrorKind {
	/// Returns a stable label suitable for attributes and log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::Configuration => "configuration_error",
			ErrorKind::ProviderExchange => "provider_exchange_error",
			ErrorKind::NetworkTimeout => "network_timeout",
			ErrorKind::Network => "network_error",
			ErrorKind::StateMismatch => "state_mismatch",
			ErrorKind::Cancelled => "cancelled",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required property is unset or empty after expression substitution.
	#[error("Required property `{property}` is missing or empty.")]
	MissingProperty {
		/// Host property name.
		property: &'static str,
	},
	/// A property value could not be interpreted.
	#[error("Property `{property}` is invalid: {reason}.")]
	InvalidProperty {
		/// Host property name.
		property: &'static str,
		/// Human-readable reason.
		reason: String,
	},
	/// Provider selector does not name a supported provider.
	#[error("Unknown provider `{value}`; expected `google` or `microsoft`.")]
	UnknownProvider {
		/// Raw selector value.
		value: String,
	},
	/// No adapter is registered for the selected provider.
	#[error("No adapter is registered for provider `{provider}`.")]
	AdapterNotRegistered {
		/// Provider label.
		provider: &'static str,
	},
	/// Credentials file could not be read.
	#[error("Credentials file `{path}` could not be read.")]
	CredentialsFileRead {
		/// Path as configured.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Credentials file is not a valid client secrets document.
	#[error("Credentials file `{path}` is malformed.")]
	CredentialsFileParse {
		/// Path as configured.
		path: String,
		/// Structured parsing failure pointing at the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Coordinator settings document is malformed.
	#[error("Coordinator settings are malformed.")]
	Settings {
		/// Structured parsing failure pointing at the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI `{value}` is invalid.")]
	InvalidRedirect {
		/// Raw redirect value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Scope entries cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Identifier validation failed.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Credential bundle validation failed.
	#[error("Unable to build credential bundle.")]
	BundleBuild(#[from] crate::auth::CredentialBundleBuilderError),
	/// Credential bundle could not be serialized.
	#[error("Credential bundle could not be serialized.")]
	BundleSerialize(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants surfaced for the caller's redelivery policy.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Token endpoint returned something other than an OAuth error document.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with a body that is not a valid token response.
	#[error("Token endpoint returned a malformed token response.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn every_variant_maps_to_one_kind() {
		assert_eq!(
			Error::from(ConfigError::MissingProperty { property: "Client ID" }).kind(),
			ErrorKind::Configuration
		);
		assert_eq!(
			Error::from(ProviderRejection::new("invalid_grant")).kind(),
			ErrorKind::ProviderExchange
		);
		assert_eq!(Error::Timeout { after: None }.kind(), ErrorKind::NetworkTimeout);
		assert_eq!(
			Error::from(TransientError::TokenEndpoint {
				message: "bad gateway".into(),
				status: Some(502),
				retry_after: None,
			})
			.kind(),
			ErrorKind::Network
		);
		assert_eq!(Error::StateMismatch { reason: "differs" }.kind(), ErrorKind::StateMismatch);
		assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
	}

	#[test]
	fn reason_and_retry_hint_follow_the_variant() {
		let rejected = Error::from(ProviderRejection::new("invalid_client"));
		let throttled = Error::from(TransientError::TokenEndpoint {
			message: "<html>busy</html>".into(),
			status: Some(503),
			retry_after: Some(Duration::seconds(30)),
		});

		assert_eq!(rejected.provider_reason(), Some(ProviderErrorKind::InvalidClient));
		assert_eq!(rejected.retry_after(), None);
		assert_eq!(throttled.provider_reason(), None);
		assert_eq!(throttled.retry_after(), Some(Duration::seconds(30)));
	}

	#[test]
	fn provider_message_is_verbatim() {
		let err = Error::from(ProviderRejection::new("invalid_grant"));

		assert_eq!(err.to_string(), "invalid_grant");
	}
}
