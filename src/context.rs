//! Caller-supplied execution context carrying cancellation and deadline signals.
//!
//! Every operation takes a [`CallContext`]. The in-flight request future is raced against the
//! context's [`CancellationToken`] and deadline; whichever fires first aborts the call and drops
//! the transport future, closing its connection. Contexts are cheap to clone and cancelling one
//! never affects calls made with another.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
// self
use crate::{_prelude::*, error::TransportError};

/// Cancellation + deadline pair scoping a single call (or a group of calls).
#[derive(Clone, Debug, Default)]
pub struct CallContext {
	cancellation: Option<CancellationToken>,
	deadline: Option<Instant>,
}
impl CallContext {
	/// Context with no cancellation source and no deadline.
	pub fn background() -> Self {
		Self::default()
	}

	/// Attaches a cancellation token; cancelling it aborts calls using this context.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = Some(token);

		self
	}

	/// Sets an absolute deadline.
	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(deadline);

		self
	}

	/// Sets a deadline relative to now.
	pub fn with_timeout(self, timeout: StdDuration) -> Self {
		self.with_deadline(Instant::now() + timeout)
	}

	/// Returns the attached cancellation token, if any.
	pub fn cancellation(&self) -> Option<&CancellationToken> {
		self.cancellation.as_ref()
	}

	/// Returns the deadline, if any.
	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Returns `true` once the attached token has been cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
	}

	/// Drives `fut` to completion unless the context is cancelled or its deadline passes first.
	///
	/// Cancellation wins over a simultaneously ready response, so a cancelled context never yields
	/// a result.
	pub async fn run<Fut, T>(&self, fut: Fut) -> Result<T, TransportError>
	where
		Fut: Future<Output = Result<T, TransportError>>,
	{
		if self.is_cancelled() {
			return Err(TransportError::Cancelled);
		}

		let bounded = async {
			match self.deadline {
				Some(deadline) => tokio::time::timeout_at(deadline, fut)
					.await
					.map_err(|source| TransportError::DeadlineExceeded { source })?,
				None => fut.await,
			}
		};

		match &self.cancellation {
			Some(token) => tokio::select! {
				biased;

				_ = token.cancelled() => Err(TransportError::Cancelled),
				result = bounded => result,
			},
			None => bounded.await,
		}
	}
}
