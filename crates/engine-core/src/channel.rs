//! Channel operations that give up as soon as the run is cancelled.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Sends `item` downstream. Returns false if the run was cancelled or the
/// receiver is gone, in which case the caller should stop producing.
pub async fn send<T>(tx: &mpsc::Sender<T>, item: T, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        res = tx.send(item) => res.is_ok(),
    }
}

/// Receives the next item, or `None` once the channel is closed or the run
/// is cancelled.
pub async fn recv<T>(rx: &mut mpsc::Receiver<T>, cancel: &CancellationToken) -> Option<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        item = rx.recv() => item,
    }
}
