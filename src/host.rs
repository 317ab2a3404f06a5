//! Boundary types shared with the host flow engine.
//!
//! The host delivers a [`WorkUnit`] (an attribute map) together with a
//! [`PropertySource`], and routes the returned [`FlowOutput`] by its [`Relationship`].

// self
use crate::_prelude::*;

/// Attribute carrying the authorization code from the redirect callback.
pub const CODE_ATTRIBUTE: &str = "http.query.param.code";
/// Attribute carrying the `state` value from the redirect callback.
pub const STATE_ATTRIBUTE: &str = "http.query.param.state";
/// Attribute carrying the state issued with the authorization URL, when the host kept it.
pub const EXPECTED_STATE_ATTRIBUTE: &str = "oauth.expected_state";
/// Output attribute holding the authorization URL.
pub const URL_ATTRIBUTE: &str = "oauth.url";
/// Output attribute holding the issued state.
pub const ISSUED_STATE_ATTRIBUTE: &str = "oauth.state";
/// Output attribute naming the outcome (`redirect`, `success`, or `failure`).
pub const STATUS_ATTRIBUTE: &str = "oauth.status";
/// Output attribute naming the content type.
pub const MIME_TYPE_ATTRIBUTE: &str = "mime.type";
/// Output attribute naming the failure category.
pub const ERROR_KIND_ATTRIBUTE: &str = "oauth.error.kind";
/// Output attribute holding the failure message.
pub const ERROR_MESSAGE_ATTRIBUTE: &str = "oauth.error.message";
/// Output attribute holding the classified provider rejection (e.g. `invalid_grant`).
pub const ERROR_REASON_ATTRIBUTE: &str = "oauth.error.reason";
/// Output attribute holding the upstream Retry-After hint in whole seconds.
pub const RETRY_AFTER_ATTRIBUTE: &str = "oauth.retry_after";

/// Inbound unit of work.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkUnit {
	attributes: BTreeMap<String, String>,
}
impl WorkUnit {
	/// Creates an empty work unit.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a copy with `name` set to `value`.
	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(name, value);

		self
	}

	/// Sets an attribute.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.attributes.insert(name.into(), value.into());
	}

	/// Looks up an attribute.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).map(String::as_str)
	}

	/// Looks up an attribute, treating blank values as absent.
	pub fn non_empty_attribute(&self, name: &str) -> Option<&str> {
		self.attribute(name).map(str::trim).filter(|value| !value.is_empty())
	}

	/// All attributes.
	pub fn attributes(&self) -> &BTreeMap<String, String> {
		&self.attributes
	}
}
impl<K, V> FromIterator<(K, V)> for WorkUnit
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self { attributes: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
	}
}

/// Read access to host-configured properties.
pub trait PropertySource: Send + Sync {
	/// Returns the raw configured value, before expression substitution.
	fn raw(&self, name: &str) -> Option<String>;

	/// Returns the value with `${attribute}` references resolved against `unit`.
	fn evaluate(&self, name: &str, unit: &WorkUnit) -> Option<String> {
		self.raw(name).map(|raw| substitute(&raw, unit))
	}
}

/// In-memory [`PropertySource`].
#[derive(Clone, Debug, Default)]
pub struct MemoryProperties(BTreeMap<String, String>);
impl MemoryProperties {
	/// Creates an empty property set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a copy with `name` set to `value`.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.set(name, value);

		self
	}

	/// Sets a property.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.0.insert(name.into(), value.into());
	}

	/// Removes a property.
	pub fn remove(&mut self, name: &str) -> Option<String> {
		self.0.remove(name)
	}
}
impl PropertySource for MemoryProperties {
	fn raw(&self, name: &str) -> Option<String> {
		self.0.get(name).cloned()
	}
}
impl<K, V> FromIterator<(K, V)> for MemoryProperties
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

/// Routing decision for a [`FlowOutput`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
	/// Redirect URL generated or tokens exchanged.
	Success,
	/// Invocation failed; see the error attributes.
	Failure,
}

/// What the host receives back for a work unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowOutput {
	/// Where the host routes the output.
	pub relationship: Relationship,
	/// Attributes to set on the outgoing unit.
	pub attributes: BTreeMap<String, String>,
	/// Outgoing content; empty on failure.
	pub content: Vec<u8>,
}
impl FlowOutput {
	/// Looks up an output attribute.
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).map(String::as_str)
	}

	/// Content as UTF-8, if it is valid UTF-8.
	pub fn content_str(&self) -> Option<&str> {
		std::str::from_utf8(&self.content).ok()
	}
}

/// Resolves `${name}` references against the unit's attributes.
///
/// Unknown attributes expand to the empty string. An unterminated `${` is kept literally.
pub fn substitute(raw: &str, unit: &WorkUnit) -> String {
	let mut out = String::with_capacity(raw.len());
	let mut rest = raw;

	while let Some(start) = rest.find("${") {
		out.push_str(&rest[..start]);

		let after = &rest[start + 2..];

		match after.find('}') {
			Some(end) => {
				out.push_str(unit.attribute(after[..end].trim()).unwrap_or_default());

				rest = &after[end + 1..];
			},
			None => {
				out.push_str(&rest[start..]);

				rest = "";
			},
		}
	}

	out.push_str(rest);

	out
}
