//! Validated client configuration.
//!
//! [`IntrospectionConfig`] can only be obtained through [`IntrospectionConfigBuilder::build`]
//! (or serde, which routes through the same checks), so a client never holds an empty
//! base URL, realm, client identifier, or client secret.

// self
use crate::{_prelude::*, secret::Secret};

/// Errors raised while validating configuration.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// A mandatory field was empty or whitespace.
	#[error("Mandatory option `{field}` is missing.")]
	MissingField {
		/// Name of the missing option.
		field: &'static str,
	},
	/// The base URL could not be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The base URL does not use HTTP(S).
	#[error("Base URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Scheme that failed validation.
		scheme: String,
	},
	/// The base URL carries a component the endpoint path cannot inherit.
	#[error("Base URL must not contain a {component}.")]
	UnexpectedComponent {
		/// Offending URL component (`query` or `fragment`).
		component: &'static str,
	},
}

/// Immutable, validated settings for an introspection client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig", into = "RawConfig")]
pub struct IntrospectionConfig {
	base_url: Url,
	realm: String,
	client_id: String,
	client_secret: Secret,
	debug_mode: bool,
}
impl IntrospectionConfig {
	/// Starts a builder seeded with every mandatory option.
	pub fn builder(
		base_url: impl Into<String>,
		realm: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
	) -> IntrospectionConfigBuilder {
		IntrospectionConfigBuilder::new(base_url, realm, client_id, client_secret)
	}

	/// Identity provider base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Realm that scopes the introspection endpoint.
	pub fn realm(&self) -> &str {
		&self.realm
	}

	/// OAuth 2.0 client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// OAuth 2.0 client secret.
	pub fn client_secret(&self) -> &Secret {
		&self.client_secret
	}

	/// Whether transport diagnostics are logged.
	pub fn debug_mode(&self) -> bool {
		self.debug_mode
	}
}

/// Builder for [`IntrospectionConfig`] values.
#[derive(Debug)]
pub struct IntrospectionConfigBuilder {
	/// Identity provider base URL (mandatory).
	pub base_url: String,
	/// Realm name (mandatory).
	pub realm: String,
	/// Client identifier (mandatory).
	pub client_id: String,
	/// Client secret (mandatory).
	pub client_secret: Secret,
	/// Enables transport diagnostics.
	pub debug_mode: bool,
}
impl IntrospectionConfigBuilder {
	/// Creates a new builder from the mandatory options.
	pub fn new(
		base_url: impl Into<String>,
		realm: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
	) -> Self {
		Self {
			base_url: base_url.into(),
			realm: realm.into(),
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			debug_mode: false,
		}
	}

	/// Toggles verbose transport logging.
	pub fn debug_mode(mut self, enabled: bool) -> Self {
		self.debug_mode = enabled;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<IntrospectionConfig, ValidationError> {
		require("base_url", &self.base_url)?;
		require("realm", &self.realm)?;
		require("client_id", &self.client_id)?;
		require("client_secret", self.client_secret.expose())?;

		let base_url = parse_base_url(&self.base_url)?;

		Ok(IntrospectionConfig {
			base_url,
			realm: self.realm,
			client_id: self.client_id,
			client_secret: self.client_secret,
			debug_mode: self.debug_mode,
		})
	}

	/// Builds the configuration or panics with the validation message.
	///
	/// Intended for process start-up where an invalid configuration should abort immediately.
	#[track_caller]
	pub fn must_build(self) -> IntrospectionConfig {
		match self.build() {
			Ok(config) => config,
			Err(e) => panic!("Invalid introspection client configuration: {e}"),
		}
	}
}

#[derive(Serialize, Deserialize)]
struct RawConfig {
	base_url: String,
	realm: String,
	client_id: String,
	client_secret: Secret,
	#[serde(default)]
	debug_mode: bool,
}
impl TryFrom<RawConfig> for IntrospectionConfig {
	type Error = ValidationError;

	fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
		IntrospectionConfigBuilder::new(raw.base_url, raw.realm, raw.client_id, raw.client_secret)
			.debug_mode(raw.debug_mode)
			.build()
	}
}
impl From<IntrospectionConfig> for RawConfig {
	fn from(config: IntrospectionConfig) -> Self {
		Self {
			base_url: config.base_url.into(),
			realm: config.realm,
			client_id: config.client_id,
			client_secret: config.client_secret,
			debug_mode: config.debug_mode,
		}
	}
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() { Err(ValidationError::MissingField { field }) } else { Ok(()) }
}

fn parse_base_url(raw: &str) -> Result<Url, ValidationError> {
	let url = Url::parse(raw.trim()).map_err(|source| ValidationError::InvalidBaseUrl { source })?;

	match url.scheme() {
		"http" | "https" => {},
		scheme => return Err(ValidationError::UnsupportedScheme { scheme: scheme.to_owned() }),
	}

	if url.query().is_some() {
		return Err(ValidationError::UnexpectedComponent { component: "query" });
	}
	if url.fragment().is_some() {
		return Err(ValidationError::UnexpectedComponent { component: "fragment" });
	}

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const BASE: &str = "http://localhost:3010";

	#[test]
	fn every_missing_mandatory_field_is_rejected() {
		let cases = [
			(IntrospectionConfig::builder("", "Bank", "id", "secret"), "base_url"),
			(IntrospectionConfig::builder(BASE, "", "id", "secret"), "realm"),
			(IntrospectionConfig::builder(BASE, "Bank", " ", "secret"), "client_id"),
			(IntrospectionConfig::builder(BASE, "Bank", "id", ""), "client_secret"),
		];

		for (builder, expected) in cases {
			let err = builder.build().expect_err("Builder should reject an empty field.");

			assert_eq!(err, ValidationError::MissingField { field: expected });
		}
	}

	#[test]
	fn complete_configuration_builds() {
		let config = IntrospectionConfig::builder(BASE, "Bank", "id", "secret")
			.build()
			.expect("Complete configuration should build.");

		assert_eq!(config.base_url().as_str(), "http://localhost:3010/");
		assert_eq!(config.realm(), "Bank");
		assert_eq!(config.client_id(), "id");
		assert_eq!(config.client_secret().expose(), "secret");
		assert!(!config.debug_mode());

		let config = IntrospectionConfig::builder(BASE, "Bank", "id", "secret")
			.debug_mode(true)
			.must_build();

		assert!(config.debug_mode());
	}

	#[test]
	fn base_url_format_is_checked() {
		let err = IntrospectionConfig::builder("not a url", "Bank", "id", "secret")
			.build()
			.expect_err("Unparseable base URL should be rejected.");

		assert!(matches!(err, ValidationError::InvalidBaseUrl { .. }));

		let err = IntrospectionConfig::builder("ftp://idp.example", "Bank", "id", "secret")
			.build()
			.expect_err("Non-HTTP scheme should be rejected.");

		assert_eq!(err, ValidationError::UnsupportedScheme { scheme: "ftp".into() });
	}

	#[test]
	fn base_url_query_and_fragment_are_rejected() {
		let err = IntrospectionConfig::builder("http://idp.example/auth?tenant=1", "Bank", "id", "s")
			.build()
			.expect_err("Query on the base URL should be rejected.");

		assert_eq!(err, ValidationError::UnexpectedComponent { component: "query" });

		let err = IntrospectionConfig::builder("http://idp.example/auth#frag", "Bank", "id", "s")
			.build()
			.expect_err("Fragment on the base URL should be rejected.");

		assert_eq!(err, ValidationError::UnexpectedComponent { component: "fragment" });

		let err = IntrospectionConfig::builder(
			"http://idp.example/auth?tenant=1#frag",
			"Bank",
			"id",
			"s",
		)
		.build()
		.expect_err("Query and fragment together should be rejected.");

		assert_eq!(err.to_string(), "Base URL must not contain a query.");
	}

	#[test]
	#[should_panic(expected = "Mandatory option `realm` is missing.")]
	fn must_build_panics_on_invalid_configuration() {
		IntrospectionConfig::builder(BASE, "", "id", "secret").must_build();
	}

	#[test]
	fn serde_routes_through_validation() {
		let config: IntrospectionConfig = serde_json::from_str(
			r#"{"base_url":"https://idp.example","realm":"Bank","client_id":"id","client_secret":"s"}"#,
		)
		.expect("Complete configuration should deserialize.");

		assert_eq!(config.realm(), "Bank");
		assert!(!config.debug_mode());
		assert!(
			serde_json::from_str::<IntrospectionConfig>(
				r#"{"base_url":"https://idp.example","realm":"","client_id":"id","client_secret":"s"}"#,
			)
			.is_err()
		);
	}

	#[test]
	fn debug_output_redacts_the_secret() {
		let config = IntrospectionConfig::builder(BASE, "Bank", "id", "hunter2").must_build();

		assert!(!format!("{config:?}").contains("hunter2"));
	}
}
