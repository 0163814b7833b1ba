use futures::Stream;
use std::pin::Pin;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::task::{Context, Poll};
use tokio_util::sync::CancellationToken;

/// Tracks whether an SSE client is still attached and cancels its session when it leaves.
#[derive(Clone)]
pub struct ConnectionMonitor {
    is_connected: Arc<AtomicBool>,
    session_ct: CancellationToken,
}

impl ConnectionMonitor {
    /// Create a new connection monitor with initial connected state
    pub fn new(session_ct: CancellationToken) -> Self {
        Self {
            is_connected: Arc::new(AtomicBool::new(true)),
            session_ct,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::Relaxed)
    }

    /// Mark the client as disconnected and cancel the session.
    ///
    /// This method is idempotent.
    pub fn mark_disconnected(&self) {
        if self.is_connected.swap(false, Ordering::Relaxed) {
            log::info!("SSE client disconnected, closing session");
            self.session_ct.cancel();
        }
    }
}

/// A wrapper stream that notices when the SSE response is finished or dropped.
///
/// axum drops the response body as soon as the client goes away, so `Drop` is the
/// reliable disconnect signal; the end of the inner stream covers server-side closes.
pub struct MonitoredStream<S> {
    inner: S,
    monitor: ConnectionMonitor,
}

impl<S> MonitoredStream<S> {
    pub fn new(stream: S, monitor: ConnectionMonitor) -> Self {
        Self {
            inner: stream,
            monitor,
        }
    }
}

impl<S> Stream for MonitoredStream<S>
where
    S: Stream + Unpin,
{
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if !self.monitor.is_connected() {
            return Poll::Ready(None);
        }

        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(None) => {
                self.monitor.mark_disconnected();
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl<S> Drop for MonitoredStream<S> {
    fn drop(&mut self) {
        self.monitor.mark_disconnected();
    }
}
