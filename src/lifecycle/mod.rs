//! Listener lifecycle: bind, spawn, subscribe, stop.

mod signal;

pub use signal::shutdown_signal;

use std::future::Future;
use std::net::SocketAddr;

use futures::Stream;
use futures::stream::BoxStream;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::distributor::{Distributor, Subscription, WeakDistributor};
use crate::receiver::{Receiver, ReceiverState, ReceiverStats};
use crate::source::DatagramSource;
use crate::types::{TelemetrySample, UpdateRate};
use crate::{ListenerConfig, Result, TelemetryError};

/// Starts telemetry listeners.
pub struct TelemetryListener;

impl TelemetryListener {
    /// Bind the configured address and start receiving.
    ///
    /// Binding happens before this returns, so an unusable address or a
    /// port already in use is reported here rather than in the background.
    pub async fn start(config: &ListenerConfig) -> Result<ListenerHandle> {
        config.validate()?;

        let addr = resolve(&config.addr).await?;
        let socket =
            UdpSocket::bind(addr).await.map_err(|e| TelemetryError::bind_failed(addr, e))?;

        info!(%addr, capacity = config.channel_capacity, "Telemetry socket bound");
        Ok(Self::spawn(socket, config.channel_capacity))
    }

    /// Start receiving from an already prepared source.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S: DatagramSource>(source: S, channel_capacity: usize) -> ListenerHandle {
        let local_addr = source.local_addr();
        let distributor = Distributor::new(channel_capacity);
        let weak = distributor.downgrade();
        let cancel = CancellationToken::new();

        let receiver = Receiver::new(source, distributor, cancel.clone());
        let state = receiver.state();
        let task = tokio::spawn(receiver.run());

        ListenerHandle { local_addr, distributor: weak, state, cancel, task: Some(task) }
    }
}

async fn resolve(addr: &str) -> Result<SocketAddr> {
    let mut candidates = tokio::net::lookup_host(addr)
        .await
        .map_err(|e| TelemetryError::invalid_address_with_source(addr, e))?;

    let resolved = candidates.next().ok_or_else(|| TelemetryError::invalid_address(addr))?;
    debug!(addr, %resolved, "Resolved listen address");
    Ok(resolved)
}

/// Handle to a running listener.
///
/// Dropping the handle cancels the receiver without waiting for it; call
/// [`stop`](Self::stop) to wait until the socket is released.
pub struct ListenerHandle {
    local_addr: Option<SocketAddr>,
    distributor: WeakDistributor,
    state: watch::Receiver<ReceiverState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<ReceiverStats>>,
}

impl ListenerHandle {
    /// Subscribe to every sample received from now on.
    ///
    /// Subscriptions taken after the listener stopped end immediately.
    pub fn subscribe(&self) -> Subscription {
        self.distributor.subscribe()
    }

    /// Subscribe as a stream delivering at most `rate` samples per second.
    pub fn subscribe_with_rate(&self, rate: UpdateRate) -> BoxStream<'static, TelemetrySample> {
        self.subscribe().with_rate(rate)
    }

    /// Address the socket is bound to.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Current receiver state.
    pub fn state(&self) -> ReceiverState {
        *self.state.borrow()
    }

    /// Receiver state changes, starting with the current state.
    pub fn state_changes(&self) -> impl Stream<Item = ReceiverState> + 'static {
        WatchStream::new(self.state.clone())
    }

    /// Token that stops the receiver when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the receiver task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the receiver and wait until it has released the socket.
    ///
    /// Returns the receiver's counters the first time; later calls do
    /// nothing and return `Ok(None)`.
    pub async fn stop(&mut self) -> Result<Option<ReceiverStats>> {
        let Some(task) = self.task.take() else {
            return Ok(None);
        };

        info!("Stopping telemetry listener");
        self.cancel.cancel();
        let stats = task.await?;
        Ok(Some(stats))
    }

    /// Run until `shutdown` completes or the receiver task ends, then stop.
    ///
    /// A receiver that ended by panicking is reported as
    /// [`TelemetryError::Join`].
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<Option<ReceiverStats>>
    where
        F: Future<Output = ()>,
    {
        let finished = match self.task.as_mut() {
            None => return Ok(None),
            Some(task) => tokio::select! {
                _ = shutdown => None,
                joined = task => Some(joined),
            },
        };

        match finished {
            None => self.stop().await,
            Some(joined) => {
                self.task = None;
                self.cancel.cancel();
                warn!("Telemetry receiver ended before shutdown");
                Ok(Some(joined?))
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        debug!("Dropping listener handle");
        self.cancel.cancel();
    }
}
