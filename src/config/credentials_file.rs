//! Google client secrets documents (`client_secret_*.json`).

// std
use std::{fs, path::Path};
// self
use crate::{_prelude::*, error::ConfigError};

/// Client secrets document as downloaded from the Google Cloud console.
///
/// The document wraps its payload in either a `web` or an `installed` object.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientSecretsFile {
	/// Web application client.
	Web(ClientSecrets),
	/// Desktop (installed) application client.
	Installed(ClientSecrets),
}
impl ClientSecretsFile {
	/// Reads and parses a document from disk.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let raw = fs::read_to_string(path).map_err(|source| ConfigError::CredentialsFileRead {
			path: path.display().to_string(),
			source,
		})?;

		Self::parse(&raw).map_err(|source| ConfigError::CredentialsFileParse {
			path: path.display().to_string(),
			source,
		})
	}

	/// Parses a document, reporting the JSON path of any failure.
	pub fn parse(raw: &str) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		let mut de = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut de)
	}

	/// Returns the wrapped client entry.
	pub fn secrets(&self) -> &ClientSecrets {
		match self {
			Self::Web(secrets) | Self::Installed(secrets) => secrets,
		}
	}
}

/// Client entry inside a [`ClientSecretsFile`].
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ClientSecrets {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	#[serde(default)]
	pub client_secret: Option<String>,
	/// Authorization endpoint.
	#[serde(default)]
	pub auth_uri: Option<Url>,
	/// Token endpoint.
	#[serde(default)]
	pub token_uri: Option<Url>,
	/// Registered redirect targets.
	#[serde(default)]
	pub redirect_uris: Vec<String>,
}
impl Debug for ClientSecrets {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientSecrets")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
			.field("auth_uri", &self.auth_uri)
			.field("token_uri", &self.token_uri)
			.field("redirect_uris", &self.redirect_uris)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn web_and_installed_documents_parse() {
		let web = ClientSecretsFile::parse(
			r#"{"web":{"client_id":"abc.apps.googleusercontent.com","project_id":"demo","auth_uri":"https://accounts.google.com/o/oauth2/auth","token_uri":"https://oauth2.googleapis.com/token","client_secret":"s3cret","redirect_uris":["https://cb"]}}"#,
		)
		.expect("Web document should parse.");

		assert!(matches!(web, ClientSecretsFile::Web(_)));
		assert_eq!(web.secrets().client_secret.as_deref(), Some("s3cret"));
		assert_eq!(
			web.secrets().token_uri.as_ref().map(Url::as_str),
			Some("https://oauth2.googleapis.com/token")
		);

		let installed = ClientSecretsFile::parse(r#"{"installed":{"client_id":"abc"}}"#)
			.expect("Installed document should parse.");

		assert_eq!(installed.secrets().client_id, "abc");
		assert!(installed.secrets().client_secret.is_none());
	}

	#[test]
	fn parse_errors_point_at_the_offending_field() {
		let err = ClientSecretsFile::parse(r#"{"web":{"client_id":42}}"#)
			.expect_err("Numeric client identifier must fail.");

		assert!(err.path().to_string().ends_with("client_id"), "Path was {}.", err.path());
	}

	#[test]
	fn debug_redacts_the_secret() {
		let file = ClientSecretsFile::parse(r#"{"web":{"client_id":"abc","client_secret":"s3cret"}}"#)
			.expect("Document should parse.");

		assert!(!format!("{file:?}").contains("s3cret"));
	}
}
