use engine_core::channel;
use tokio::{sync::mpsc, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Merges `sources` into one channel of the given capacity, with one
/// forwarding task per source. The merged channel closes once every source
/// is exhausted, or as soon as the run is cancelled.
pub fn fan_in<T: Send + 'static>(
    sources: Vec<mpsc::Receiver<T>>,
    capacity: usize,
    cancel: &CancellationToken,
    tasks: &mut JoinSet<()>,
) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    for mut source in sources {
        let tx = tx.clone();
        let cancel = cancel.clone();
        tasks.spawn(
            async move {
                while let Some(item) = channel::recv(&mut source, &cancel).await {
                    if !channel::send(&tx, item, &cancel).await {
                        return;
                    }
                }
            }
            .in_current_span(),
        );
    }

    rx
}
