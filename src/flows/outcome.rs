//! Normalized result of one invocation and its translation into host output.

// self
use crate::{
	_prelude::*,
	auth::CredentialBundle,
	error::ErrorKind,
	host::{
		ERROR_KIND_ATTRIBUTE, ERROR_MESSAGE_ATTRIBUTE, ERROR_REASON_ATTRIBUTE, FlowOutput,
		ISSUED_STATE_ATTRIBUTE, MIME_TYPE_ATTRIBUTE, RETRY_AFTER_ATTRIBUTE, Relationship,
		STATUS_ATTRIBUTE, URL_ATTRIBUTE,
	},
	provider::ProviderErrorKind,
};

/// The only thing [`crate::flows::FlowCoordinator`] returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
	/// The user agent must visit `url`.
	RedirectReady {
		/// Authorization URL.
		url: Url,
		/// State embedded in the URL.
		state: String,
	},
	/// The code was redeemed.
	Exchanged(CredentialBundle),
	/// The invocation failed; nothing was produced.
	Failed {
		/// Failure category.
		kind: ErrorKind,
		/// Human-readable message; provider rejections keep the provider's wording.
		message: String,
		/// Classified provider rejection, for [`ErrorKind::ProviderExchange`] failures.
		reason: Option<ProviderErrorKind>,
		/// Upstream Retry-After hint, for transient [`ErrorKind::Network`] failures.
		retry_after: Option<Duration>,
	},
}
impl Outcome {
	/// Builds a [`Outcome::Failed`] from a crate error.
	pub fn failed(error: &Error) -> Self {
		Outcome::Failed {
			kind: error.kind(),
			message: error.to_string(),
			reason: error.provider_reason(),
			retry_after: error.retry_after(),
		}
	}

	/// Failure category, if the invocation failed.
	pub fn error_kind(&self) -> Option<ErrorKind> {
		match self {
			Outcome::Failed { kind, .. } => Some(*kind),
			_ => None,
		}
	}

	/// Converts the outcome into attributes and content for the host.
	pub fn into_output(self) -> FlowOutput {
		let mut attributes = BTreeMap::new();

		match self {
			Outcome::RedirectReady { url, state } => {
				attributes.insert(URL_ATTRIBUTE.into(), url.to_string());
				attributes.insert(ISSUED_STATE_ATTRIBUTE.into(), state);
				attributes.insert(STATUS_ATTRIBUTE.into(), "redirect".into());

				FlowOutput {
					relationship: Relationship::Success,
					attributes,
					content: String::from(url).into_bytes(),
				}
			},
			Outcome::Exchanged(bundle) => match bundle.to_json_pretty() {
				Ok(json) => {
					attributes.insert(STATUS_ATTRIBUTE.into(), "success".into());
					attributes.insert(MIME_TYPE_ATTRIBUTE.into(), "application/json".into());

					FlowOutput {
						relationship: Relationship::Success,
						attributes,
						content: json.into_bytes(),
					}
				},
				Err(e) => Outcome::failed(&e.into()).into_output(),
			},
			Outcome::Failed { kind, message, reason, retry_after } => {
				attributes.insert(STATUS_ATTRIBUTE.into(), "failure".into());
				attributes.insert(ERROR_KIND_ATTRIBUTE.into(), kind.as_str().into());
				attributes.insert(ERROR_MESSAGE_ATTRIBUTE.into(), message);

				if let Some(reason) = reason {
					attributes.insert(ERROR_REASON_ATTRIBUTE.into(), reason.as_str().into());
				}
				if let Some(delay) = retry_after {
					attributes
						.insert(RETRY_AFTER_ATTRIBUTE.into(), delay.whole_seconds().to_string());
				}

				FlowOutput { relationship: Relationship::Failure, attributes, content: Vec::new() }
			},
		}
	}
}
