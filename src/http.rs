//! Transport primitives for introspection calls.
//!
//! The module exposes [`IntrospectionHttpClient`], the client's only dependency on an HTTP
//! stack, plus the reqwest-backed default. Requests and responses use the `oauth2` crate's
//! [`HttpRequest`]/[`HttpResponse`] aliases so any [`AsyncHttpClient`] can be plugged in.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
#[cfg(feature = "reqwest")] use oauth2::{HttpRequest, HttpResponse};
// self
#[cfg(feature = "reqwest")] use crate::obs;
use crate::{_prelude::*, error::TransportError};

/// Abstraction over HTTP transports able to execute introspection requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back many cloned
/// clients, and the handles they return must own whatever state the request future needs so
/// those futures stay `Send` while in flight. Connection pooling, if any, belongs to the
/// implementation; the client keeps no per-call state on it.
pub trait IntrospectionHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single call.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle; with `debug_mode` set the handle logs requests and responses.
	fn handle(&self, debug_mode: bool) -> Self::Handle;
}

/// Converts a transport-level [`HttpClientError`] into the client's [`TransportError`].
pub fn map_client_error<E>(err: HttpClientError<E>) -> TransportError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner),
		HttpClientError::Http(inner) => TransportError::Request(inner),
		HttpClientError::Io(inner) => TransportError::Io(inner),
		HttpClientError::Other(message) => TransportError::Other { message },
		_ => TransportError::Other { message: "unrecognized HTTP client failure".into() },
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The wrapped client is cloned into every handle; reqwest clients share their connection pool
/// across clones.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl IntrospectionHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self, debug_mode: bool) -> Self::Handle {
		ReqwestHandle { client: self.0.clone(), debug_mode }
	}
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`IntrospectionHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHandle {
	client: ReqwestClient,
	debug_mode: bool,
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			if self.debug_mode {
				obs::debug_request(&request);
			}

			let response =
				self.client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(Box::new)?.to_vec();

			if self.debug_mode {
				obs::debug_response(status.as_u16(), body.len());
			}

			let mut response_new = HttpResponse::new(body);

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
