// self
use crate::{_prelude::*, obs::OperationKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided operation + realm.
	pub fn new(kind: OperationKind, realm: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("keycloak_introspect.call", operation = kind.as_str(), realm);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, realm);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits the debug-mode record for an outgoing request.
///
/// Header values are never logged; only their names are, so credentials stay out of sinks.
pub(crate) fn debug_request(request: &oauth2::HttpRequest) {
	#[cfg(feature = "tracing")]
	{
		let headers = request.headers().keys().map(|name| name.as_str()).collect::<Vec<_>>();

		tracing::debug!(
			method = %request.method(),
			uri = %request.uri(),
			headers = ?headers,
			body_len = request.body().len(),
			"sending introspection request"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = request;
	}
}

/// Emits the debug-mode record for a received response.
pub(crate) fn debug_response(status: u16, body_len: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(status, body_len, "received introspection response");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (status, body_len);
	}
}
