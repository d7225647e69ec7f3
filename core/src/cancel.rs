//! Cancellation of in-flight exchanges.
//!
//! A `CancelSource` pairs a token with its trigger. The token is attached to
//! a call with `Dispatcher::with_cancel`; calling `cancel` before the
//! exchange settles makes that call resolve to an aborted envelope.
//! Cancelling after completion does nothing.

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: CancellationToken,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Resolves once the paired source has been cancelled.
    pub async fn cancelled(&self) {
        self.inner.cancelled().await;
    }
}

#[derive(Debug, Clone, Default)]
pub struct CancelSource {
    token: CancelToken,
}

impl CancelSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
