use sched_types::SessionRecord;
use tokio::sync::oneshot;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::{ClientError, ClientResult};

/// Handle to a session listing running on a background task.
///
/// The result is delivered once, through [`wait`](Self::wait). Dropping
/// the handle cancels the request.
#[derive(Debug)]
pub struct PendingSessionList {
    receiver: oneshot::Receiver<ClientResult<Vec<SessionRecord>>>,
    cancel: CancellationToken,
    _cancel_on_drop: DropGuard,
}

impl PendingSessionList {
    pub(crate) fn new(
        receiver: oneshot::Receiver<ClientResult<Vec<SessionRecord>>>,
        cancel: CancellationToken,
    ) -> Self {
        let _cancel_on_drop = cancel.clone().drop_guard();
        Self {
            receiver,
            cancel,
            _cancel_on_drop,
        }
    }

    /// Ask the request to stop. `wait` then resolves with `Cancelled`
    /// unless the response already arrived.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the single result of the request.
    pub async fn wait(self) -> ClientResult<Vec<SessionRecord>> {
        let PendingSessionList {
            receiver,
            _cancel_on_drop,
            ..
        } = self;
        // Sender dropped without a result: the task was aborted.
        receiver.await.unwrap_or(Err(ClientError::Cancelled))
    }
}
