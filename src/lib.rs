//! RFC 7662 token introspection client for Keycloak-style realms: authenticate with client
//! credentials, normalize string-or-array audiences, and honor caller cancellation on every call.

#![deny(clippy::all, missing_docs)]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub mod config;
pub mod context;
pub mod decode;
pub mod error;
pub mod http;
pub mod introspect;
pub mod obs;
pub mod request;
pub mod secret;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::IntrospectionConfig, http::ReqwestHttpClient, introspect::IntrospectionClient,
	};

	/// Client identifier shared by integration tests.
	pub const TEST_CLIENT_ID: &str = "introspector";
	/// Client secret shared by integration tests.
	pub const TEST_CLIENT_SECRET: &str = "introspector-secret";
	/// Realm shared by integration tests.
	pub const TEST_REALM: &str = "Bank";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a validated configuration pointing at `base_url` with the shared test credentials.
	pub fn test_config(base_url: &str) -> IntrospectionConfig {
		IntrospectionConfig::builder(base_url, TEST_REALM, TEST_CLIENT_ID, TEST_CLIENT_SECRET)
			.debug_mode(true)
			.build()
			.expect("Test configuration should be valid.")
	}

	/// Constructs an [`IntrospectionClient`] backed by the reqwest transport used across
	/// integration tests.
	pub fn build_reqwest_test_client(base_url: &str) -> IntrospectionClient<ReqwestHttpClient> {
		IntrospectionClient::with_http_client(test_config(base_url), test_reqwest_http_client())
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
