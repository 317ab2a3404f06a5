//! Provider strategy hooks that customize token exchanges.
//!
//! Implementations decorate outgoing token requests and classify provider rejections
//! without tying adapters to any particular HTTP client.

// self
use crate::_prelude::*;

/// Strategy hook that allows providers to decorate requests and classify errors.
///
/// Implementors are required to be `Send + Sync`, and the hooks only see crate-owned data
/// types so downstream crates never depend on reqwest-specific structures.
pub trait ProviderStrategy: Send + Sync {
	/// Classifies a failed token request into a [`ProviderErrorKind`].
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;

	/// Adds custom form parameters to the code exchange before dispatching.
	///
	/// The default implementation does nothing. Override it when a deployment needs extra
	/// fields such as `resource` or `audience`.
	fn augment_token_request(&self, _form: &mut BTreeMap<String, String>) {}
}

/// Canonical provider error categories used by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
	/// Provider rejected the authorization code or redirect URI.
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes were refused.
	InsufficientScope,
	/// Provider reported a temporary condition.
	Transient,
	/// Provider answered `200 OK` with a token document that cannot be used.
	MalformedResponse,
}
impl ProviderErrorKind {
	/// Returns a stable label suitable for attributes and log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderErrorKind::InvalidGrant => "invalid_grant",
			ProviderErrorKind::InvalidClient => "invalid_client",
			ProviderErrorKind::InsufficientScope => "insufficient_scope",
			ProviderErrorKind::Transient => "transient",
			ProviderErrorKind::MalformedResponse => "malformed_response",
		}
	}
}

/// Provider-side rejection of a code exchange.
///
/// `Display` renders the provider's own wording: the OAuth `error` code, followed by the
/// `error_description` when one was sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderRejection {
	/// Classified category.
	pub kind: ProviderErrorKind,
	/// OAuth `error` field (or a local code for malformed responses).
	pub error: String,
	/// OAuth `error_description` field.
	pub description: Option<String>,
	/// HTTP status of the token response.
	pub status: Option<u16>,
}
impl ProviderRejection {
	/// Creates a rejection from a bare OAuth error code, classified by the default strategy.
	pub fn new(error: impl Into<String>) -> Self {
		let error = error.into();
		let kind = DefaultProviderStrategy
			.classify_token_error(&ProviderErrorContext::default().with_oauth_error(error.clone()));

		Self { kind, error, description: None, status: None }
	}

	/// Creates a rejection for a token response the crate cannot turn into a bundle.
	pub fn malformed_response(reason: impl Into<String>) -> Self {
		Self {
			kind: ProviderErrorKind::MalformedResponse,
			error: "invalid_token_response".into(),
			description: Some(reason.into()),
			status: None,
		}
	}

	/// Attaches the `error_description` field.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());

		self
	}

	/// Attaches the HTTP status.
	pub fn with_status(mut self, status: Option<u16>) -> Self {
		self.status = status;

		self
	}

	/// Overrides the classification.
	pub fn with_kind(mut self, kind: ProviderErrorKind) -> Self {
		self.kind = kind;

		self
	}
}
impl Display for ProviderRejection {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match &self.description {
			Some(description) => write!(f, "{}: {description}", self.error),
			None => f.write_str(&self.error),
		}
	}
}
impl StdError for ProviderRejection {}

/// Context passed to provider strategies when classifying token errors.
///
/// Only primitive data (status codes, OAuth fields, body preview) is carried so
/// strategies stay decoupled from any HTTP client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
	/// Preview of the response body for non-JSON payloads.
	pub body_preview: Option<String>,
}
impl ProviderErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Adds an HTTP status code (e.g., 400, 401, 500).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds a body preview for providers that return non-JSON payloads.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}
}

/// Default strategy that applies RFC 6749 heuristics.
///
/// Structured OAuth fields win, then body text hints, then the HTTP status code.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		if let Some(kind) =
			classify_oauth_error(ctx.oauth_error.as_deref(), ctx.error_description.as_deref())
		{
			return kind;
		}
		if let Some(kind) = classify_body(ctx.body_preview.as_deref()) {
			return kind;
		}

		classify_status(ctx.http_status)
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProviderErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = body.chars().take(ProviderErrorContext::BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

fn classify_oauth_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
) -> Option<ProviderErrorKind> {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_body(error_description))
}

fn match_exact_value(value: &str) -> Option<ProviderErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant") || value.eq_ignore_ascii_case("access_denied") {
		Some(ProviderErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(ProviderErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_scope")
		|| value.eq_ignore_ascii_case("insufficient_scope")
	{
		Some(ProviderErrorKind::InsufficientScope)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<ProviderErrorKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		// Microsoft puts the AADSTS code in the description; AADSTS70008 is an expired code.
		text if text.contains("invalid_grant") || text.contains("aadsts70008") =>
			Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") || text.contains("aadsts7000215") =>
			Some(ProviderErrorKind::InvalidClient),
		text if text.contains("insufficient_scope") || text.contains("invalid_scope") =>
			Some(ProviderErrorKind::InsufficientScope),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(ProviderErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(400 | 404 | 410) => ProviderErrorKind::InvalidGrant,
		Some(401) => ProviderErrorKind::InvalidClient,
		Some(403) => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Transient,
	}
}
