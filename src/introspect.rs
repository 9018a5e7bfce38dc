//! RFC 7662 token introspection against a Keycloak realm.
//!
//! [`IntrospectionClient`] is the public entry point. Each call builds a form body with the
//! client credentials and the token, posts it to
//! `{base}/realms/{realm}/protocol/openid-connect/token/introspect`, and decodes the JSON answer
//! into the result type the caller asked for. There is no caching and no retry: one call, one
//! round trip, reflecting the provider's judgment at that moment.

// self
use crate::{
	_prelude::*,
	config::IntrospectionConfig,
	context::CallContext,
	decode::{ExtendedIntrospectionResult, IntrospectionResponse, IntrospectionResult},
	http::IntrospectionHttpClient,
	obs::{self, CallOutcome, CallSpan, OperationKind},
	request::AuthenticatedRequest,
};
#[cfg(feature = "reqwest")]
use crate::{config::IntrospectionConfigBuilder, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestIntrospectionClient = IntrospectionClient<ReqwestHttpClient>;

/// Immutable introspection client.
///
/// Cloning is cheap: clones share the configuration and the transport, so one instance can
/// serve concurrent calls from independent tasks.
pub struct IntrospectionClient<C>
where
	C: ?Sized + IntrospectionHttpClient,
{
	config: Arc<IntrospectionConfig>,
	http_client: Arc<C>,
	endpoint: Url,
}
impl<C> IntrospectionClient<C>
where
	C: ?Sized + IntrospectionHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(config: IntrospectionConfig, http_client: impl Into<Arc<C>>) -> Self {
		let endpoint = introspection_endpoint(config.base_url(), config.realm());

		Self { config: Arc::new(config), http_client: http_client.into(), endpoint }
	}

	/// Validated configuration backing this client.
	pub fn config(&self) -> &IntrospectionConfig {
		&self.config
	}

	/// Fully resolved introspection endpoint.
	pub fn introspection_url(&self) -> &Url {
		&self.endpoint
	}

	/// Asks the provider whether `token` is active.
	pub async fn introspect(&self, ctx: &CallContext, token: &str) -> Result<IntrospectionResult> {
		self.introspect_as(ctx, token).await
	}

	/// Like [`introspect`](Self::introspect), also decoding `exp`, `iat`, and `aud`.
	pub async fn introspect_extended(
		&self,
		ctx: &CallContext,
		token: &str,
	) -> Result<ExtendedIntrospectionResult> {
		self.introspect_as(ctx, token).await
	}

	/// Introspects `token` and decodes the response into `R`.
	///
	/// Transport failures (including cancellation and deadline expiry) become
	/// [`Error::Transport`]; bodies that do not fit `R` become [`Error::Decode`]. The decoded value
	/// is returned as the provider stated it.
	pub async fn introspect_as<R>(&self, ctx: &CallContext, token: &str) -> Result<R>
	where
		R: IntrospectionResponse,
	{
		const KIND: OperationKind = OperationKind::Introspect;

		let span = CallSpan::new(KIND, self.config.realm());

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let form = [
					("client_id", self.config.client_id()),
					("client_secret", self.config.client_secret().expose()),
					("token", token),
				];
				let body = AuthenticatedRequest::new(ctx, &self.config)
					.form(&self.endpoint, form)
					.map_err(|e| Error::transport(KIND, e))?
					.send(self.http_client.as_ref(), self.config.debug_mode())
					.await
					.map_err(|e| Error::transport(KIND, e))?;

				R::decode(&body).map_err(|e| Error::decode(KIND, e))
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}
}
#[cfg(feature = "reqwest")]
impl IntrospectionClient<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(config: IntrospectionConfig) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}

	/// Validates `builder` and creates a reqwest-backed client from it.
	pub fn from_builder(builder: IntrospectionConfigBuilder) -> Result<Self> {
		Ok(Self::new(builder.build()?))
	}
}
impl<C> Clone for IntrospectionClient<C>
where
	C: ?Sized + IntrospectionHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			http_client: self.http_client.clone(),
			endpoint: self.endpoint.clone(),
		}
	}
}
impl<C> Debug for IntrospectionClient<C>
where
	C: ?Sized + IntrospectionHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IntrospectionClient")
			.field("config", &self.config)
			.field("endpoint", &self.endpoint.as_str())
			.finish()
	}
}

fn introspection_endpoint(base: &Url, realm: &str) -> Url {
	let mut url = base.clone();

	// HTTP(S) URLs always have a path, so this only fails for cannot-be-a-base URLs, which
	// configuration validation already rejects.
	if let Ok(mut segments) = url.path_segments_mut() {
		segments
			.pop_if_empty()
			.push("realms")
			.push(realm)
			.extend(OperationKind::Introspect.endpoint_segments());
	}

	url
}
