//! Authenticated request construction shared by every provider operation.
//!
//! [`AuthenticatedRequest`] primes a `POST` with the client's Basic credentials and the
//! form content type; the operation supplies the target URL and form pairs. Sending goes through
//! [`PreparedRequest::send`], which races the transport against the caller's [`CallContext`].

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use oauth2::{
	AsyncHttpClient, HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
		request::Builder,
	},
};
use url::form_urlencoded::Serializer as FormSerializer;
// self
use crate::{
	_prelude::*,
	config::IntrospectionConfig,
	context::CallContext,
	error::TransportError,
	http::{self, IntrospectionHttpClient},
};

/// Media type of every request body sent to the provider.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Unsent request carrying authentication and encoding headers but no target or body.
pub struct AuthenticatedRequest<'ctx> {
	ctx: &'ctx CallContext,
	builder: Builder,
}
impl<'ctx> AuthenticatedRequest<'ctx> {
	/// Starts a request bound to `ctx` using the credentials in `config`.
	///
	/// Basic authentication is attached whenever the client identifier or secret is non-empty.
	pub fn new(ctx: &'ctx CallContext, config: &IntrospectionConfig) -> Self {
		let mut builder = Request::builder()
			.method(Method::POST)
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, JSON_CONTENT_TYPE);
		let client_id = config.client_id();
		let client_secret = config.client_secret().expose();

		if !client_id.is_empty() || !client_secret.is_empty() {
			builder = builder.header(AUTHORIZATION, basic_auth(client_id, client_secret));
		}

		Self { ctx, builder }
	}

	/// Targets `url` with a URL-encoded body built from `pairs`, in iteration order.
	pub fn form<'a, I>(self, url: &Url, pairs: I) -> Result<PreparedRequest<'ctx>, TransportError>
	where
		I: IntoIterator<Item = (&'a str, &'a str)>,
	{
		let body = FormSerializer::new(String::new()).extend_pairs(pairs).finish();
		let request = self.builder.uri(url.as_str()).body(body.into_bytes())?;

		Ok(PreparedRequest { ctx: self.ctx, request })
	}
}
impl Debug for AuthenticatedRequest<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatedRequest").field("ctx", self.ctx).finish_non_exhaustive()
	}
}

/// Fully assembled request waiting to be sent.
pub struct PreparedRequest<'ctx> {
	ctx: &'ctx CallContext,
	request: HttpRequest,
}
impl PreparedRequest<'_> {
	/// Borrows the assembled request.
	pub fn request(&self) -> &HttpRequest {
		&self.request
	}

	/// Sends the request and returns the body of a 2xx response.
	///
	/// Non-success statuses, transport failures, cancellation, and deadline expiry all surface as
	/// [`TransportError`].
	pub async fn send<C>(self, http_client: &C, debug_mode: bool) -> Result<Vec<u8>, TransportError>
	where
		C: ?Sized + IntrospectionHttpClient,
	{
		let Self { ctx, request } = self;
		let handle = http_client.handle(debug_mode);

		ctx.run(async {
			let response = handle.call(request).await.map_err(http::map_client_error)?;
			let status = response.status();

			if !status.is_success() {
				return Err(TransportError::status(status.as_u16(), response.body()));
			}

			Ok(response.into_body())
		})
		.await
	}
}
impl Debug for PreparedRequest<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PreparedRequest")
			.field("ctx", self.ctx)
			.field("method", self.request.method())
			.field("uri", self.request.uri())
			.finish_non_exhaustive()
	}
}

fn basic_auth(username: &str, password: &str) -> String {
	format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> IntrospectionConfig {
		IntrospectionConfig::builder("https://idp.example", "Bank", "introspector", "s3cr3t")
			.must_build()
	}

	#[test]
	fn basic_auth_encodes_credentials() {
		assert_eq!(basic_auth("Aladdin", "open sesame"), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
	}

	#[test]
	fn prepared_request_carries_auth_and_form_headers() {
		let ctx = CallContext::background();
		let url = Url::parse("https://idp.example/introspect").expect("Fixture URL should parse.");
		let prepared = AuthenticatedRequest::new(&ctx, &config())
			.form(&url, [("token", "a b&c"), ("client_id", "introspector")])
			.expect("Request should assemble.");
		let request = prepared.request();

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri(), "https://idp.example/introspect");
		assert_eq!(request.headers()[CONTENT_TYPE], FORM_CONTENT_TYPE);
		assert_eq!(request.headers()[ACCEPT], JSON_CONTENT_TYPE);
		assert_eq!(request.headers()[AUTHORIZATION], basic_auth("introspector", "s3cr3t").as_str());
		assert_eq!(request.body().as_slice(), b"token=a+b%26c&client_id=introspector");
	}
}
