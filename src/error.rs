//! Client-level error types shared by configuration, transport, and decoding.

// self
use crate::{_prelude::*, config::ValidationError, decode::AudienceFormatError, obs::OperationKind};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Canonical error exposed by public APIs.
///
/// The three families never overlap, so callers can tell a misconfigured client from an
/// unreachable provider and from a provider that answered with an unexpected payload.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Configuration rejected before a client could be built.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// The call did not produce a successful HTTP response.
	#[error("Keycloak {operation} call failed.")]
	Transport {
		/// Operation that issued the call.
		operation: OperationKind,
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
	/// The provider answered, but the body did not match the expected shape.
	#[error("Keycloak {operation} response could not be decoded.")]
	Decode {
		/// Operation that issued the call.
		operation: OperationKind,
		/// Underlying decoding failure.
		#[source]
		source: DecodeError,
	},
}
impl Error {
	/// Wraps a transport failure with the operation that produced it.
	pub fn transport(operation: OperationKind, source: impl Into<TransportError>) -> Self {
		Self::Transport { operation, source: source.into() }
	}

	/// Wraps a decoding failure with the operation that produced it.
	pub fn decode(operation: OperationKind, source: impl Into<DecodeError>) -> Self {
		Self::Decode { operation, source: source.into() }
	}

	/// Returns `true` for configuration failures.
	pub fn is_validation(&self) -> bool {
		matches!(self, Self::Validation(_))
	}

	/// Returns `true` for network, status, cancellation, and deadline failures.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport { .. })
	}

	/// Returns `true` for response decoding failures.
	pub fn is_decode(&self) -> bool {
		matches!(self, Self::Decode { .. })
	}
}

/// Transport-level failures (network, IO, status, cancellation).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the introspection endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the introspection endpoint.")]
	Io(#[from] std::io::Error),
	/// The outbound request could not be assembled.
	#[error("Introspection request could not be assembled.")]
	Request(#[from] oauth2::http::Error),
	/// Provider answered with a non-success status.
	#[error("Introspection endpoint responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// Caller cancelled the call before a response arrived.
	#[error("Introspection call was cancelled by the caller.")]
	Cancelled,
	/// Caller deadline elapsed before a response arrived.
	#[error("Introspection call exceeded the caller deadline.")]
	DeadlineExceeded {
		/// Deadline expiry reported by the timer.
		#[source]
		source: tokio::time::error::Elapsed,
	},
	/// HTTP client failure that does not fit any other variant.
	#[error("HTTP client error occurred while calling the introspection endpoint: {message}.")]
	Other {
		/// Client-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds a status failure, keeping only a short prefix of the body.
	pub fn status(status: u16, body: &[u8]) -> Self {
		Self::Status { status, body: body_preview(body) }
	}

	/// Returns `true` when the caller cancelled the call or its deadline elapsed.
	pub fn is_cancellation(&self) -> bool {
		matches!(self, Self::Cancelled | Self::DeadlineExceeded { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Response body could not be interpreted as the requested result type.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body is not JSON or a field has the wrong type.
	#[error("Introspection response is malformed at `{}`: {}.", .source.path(), .source.inner())]
	Body {
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// Truncated raw body.
		preview: String,
	},
	/// The audience claim was neither a string nor an array of strings.
	#[error(transparent)]
	Audience(#[from] AudienceFormatError),
}
impl DecodeError {
	pub(crate) fn body(source: serde_path_to_error::Error<serde_json::Error>, raw: &[u8]) -> Self {
		Self::Body { source, preview: body_preview(raw) }
	}
}

fn body_preview(raw: &[u8]) -> String {
	let text = String::from_utf8_lossy(raw);

	match text.char_indices().nth(BODY_PREVIEW_LIMIT) {
		Some((idx, _)) => format!("{}...", &text[..idx]),
		None => text.into_owned(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn body_preview_truncates_on_char_boundary() {
		let long = "é".repeat(BODY_PREVIEW_LIMIT + 10);
		let preview = body_preview(long.as_bytes());

		assert!(preview.ends_with("..."));
		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 3);
		assert_eq!(body_preview(b"short"), "short");
	}

	#[test]
	fn wrapped_errors_name_the_operation_and_keep_the_cause() {
		let err = Error::transport(OperationKind::Introspect, TransportError::Cancelled);

		assert!(err.is_transport());
		assert_eq!(err.to_string(), "Keycloak introspect call failed.");

		let source = err.source().expect("Transport errors must expose their cause.");

		assert_eq!(source.to_string(), TransportError::Cancelled.to_string());
	}

	#[test]
	fn wrapped_messages_leave_the_cause_to_the_chain() {
		let err = Error::decode(
			OperationKind::Introspect,
			AudienceFormatError { raw: "42".into() },
		);
		let chain = std::iter::successors(Some(&err as &dyn StdError), |e| (*e).source())
			.map(ToString::to_string)
			.collect::<Vec<_>>();

		assert_eq!(chain, [
			"Keycloak introspect response could not be decoded.",
			"Invalid audience format: 42.",
		]);

		let err = ValidationError::InvalidBaseUrl { source: url::ParseError::EmptyHost };

		assert_eq!(err.to_string(), "Base URL is invalid.");
		assert_eq!(
			err.source().map(ToString::to_string),
			Some(url::ParseError::EmptyHost.to_string())
		);
	}
}
