//! Optional observability helpers for introspection calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `keycloak_introspect.call` with the
//!   `operation` and `realm` fields. Debug-mode transport events are emitted inside that span.
//! - Enable `metrics` to increment the `keycloak_introspect_call_total` counter once when a
//!   call starts and once when it settles, labeled by `operation` + `outcome`. Failures are
//!   split by family so a dashboard can tell an unreachable provider from a malformed answer.

mod tracing;

pub use tracing::*;

// self
use crate::_prelude::*;

/// Provider operations issued by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// RFC 7662 token introspection.
	Introspect,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Introspect => "introspect",
		}
	}

	/// Path segments of the operation's endpoint below `{base}/realms/{realm}`.
	pub const fn endpoint_segments(self) -> &'static [&'static str] {
		match self {
			OperationKind::Introspect => &["protocol", "openid-connect", "token", "introspect"],
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// The call was issued.
	Attempt,
	/// The provider answered and the body decoded.
	Success,
	/// Configuration was rejected.
	InvalidConfig,
	/// No usable HTTP response: network, status, cancellation, or deadline.
	TransportFailure,
	/// The provider answered with a body that did not decode.
	DecodeFailure,
}
impl CallOutcome {
	/// Classifies a settled call.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => CallOutcome::Success,
			Err(Error::Validation(_)) => CallOutcome::InvalidConfig,
			Err(Error::Transport { .. }) => CallOutcome::TransportFailure,
			Err(Error::Decode { .. }) => CallOutcome::DecodeFailure,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::InvalidConfig => "invalid_config",
			CallOutcome::TransportFailure => "transport_failure",
			CallOutcome::DecodeFailure => "decode_failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: OperationKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"keycloak_introspect_call_total",
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}
