//! Fan-out distribution of decoded samples.
//!
//! The [`Distributor`] sits between the receiver and any number of
//! subscribers. Every subscriber has its own read cursor; a slow subscriber
//! never holds up the receiver or other subscribers. When a subscriber falls
//! more than `capacity` samples behind, its oldest unread samples are
//! dropped and counted in [`Subscription::dropped`].

use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

use crate::stream::ThrottleExt;
use crate::types::{TelemetrySample, UpdateRate};

/// Publishing side of the sample channel.
///
/// Cloning a `Distributor` yields another publisher for the same channel.
/// Subscriptions end once every publisher has been dropped.
#[derive(Debug, Clone)]
pub struct Distributor {
    sender: broadcast::Sender<TelemetrySample>,
    capacity: usize,
}

impl Distributor {
    /// Default number of samples buffered per subscriber.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Largest number of samples buffered per subscriber.
    pub const MAX_CAPACITY: usize = 65_536;

    /// Create a distributor buffering at least `capacity` samples per
    /// subscriber.
    ///
    /// The buffer holds a power of two samples, so `capacity` is rounded up
    /// to the next power of two and clamped to `1..=MAX_CAPACITY`.
    /// [`capacity`](Self::capacity) reports the resulting bound.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Self::MAX_CAPACITY).next_power_of_two();
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Hand a sample to every current subscriber.
    ///
    /// Never blocks. Returns the number of subscribers that will see the
    /// sample; with no subscribers the sample is discarded.
    pub fn publish(&self, sample: TelemetrySample) -> usize {
        self.sender.send(sample).unwrap_or(0)
    }

    /// Subscribe to samples published from now on.
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.sender.subscribe())
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Samples buffered per subscriber before the oldest are dropped.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// A handle that can subscribe without keeping the channel open.
    pub fn downgrade(&self) -> WeakDistributor {
        WeakDistributor { sender: self.sender.downgrade(), capacity: self.capacity }
    }
}

impl Default for Distributor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// Non-owning reference to a [`Distributor`].
#[derive(Clone)]
pub struct WeakDistributor {
    sender: broadcast::WeakSender<TelemetrySample>,
    capacity: usize,
}

impl WeakDistributor {
    /// Upgrade to a publisher, if any publisher is still alive.
    pub fn upgrade(&self) -> Option<Distributor> {
        self.sender.upgrade().map(|sender| Distributor { sender, capacity: self.capacity })
    }

    /// Subscribe if the channel is still open, otherwise return an
    /// already-finished subscription.
    pub fn subscribe(&self) -> Subscription {
        match self.upgrade() {
            Some(distributor) => distributor.subscribe(),
            None => Subscription::closed(),
        }
    }
}

/// One subscriber's view of the sample stream.
///
/// Samples arrive in publish order. `recv` returns `None` once all
/// publishers are gone and the buffered samples have been read.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<TelemetrySample>,
    dropped: u64,
}

impl Subscription {
    fn new(receiver: broadcast::Receiver<TelemetrySample>) -> Self {
        Self { receiver, dropped: 0 }
    }

    fn closed() -> Self {
        let (sender, receiver) = broadcast::channel(1);
        drop(sender);
        Self::new(receiver)
    }

    /// Wait for the next sample.
    pub async fn recv(&mut self) -> Option<TelemetrySample> {
        loop {
            match self.receiver.recv().await {
                Ok(sample) => return Some(sample),
                Err(RecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(RecvError::Closed) => {
                    debug!(dropped = self.dropped, "Sample channel closed");
                    return None;
                }
            }
        }
    }

    /// Take the next sample if one is already buffered.
    pub fn try_recv(&mut self) -> Option<TelemetrySample> {
        loop {
            match self.receiver.try_recv() {
                Ok(sample) => return Some(sample),
                Err(TryRecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Total samples this subscriber lost by falling behind.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Convert into a `Stream` of samples.
    pub fn into_stream(self) -> impl Stream<Item = TelemetrySample> + Send + 'static {
        futures::stream::unfold(self, |mut subscription| async move {
            let sample = subscription.recv().await?;
            Some((sample, subscription))
        })
    }

    /// Convert into a stream delivering at most `rate` samples per second.
    ///
    /// Throttled streams keep only the newest sample of each interval.
    pub fn with_rate(self, rate: UpdateRate) -> BoxStream<'static, TelemetrySample> {
        match rate.throttle_interval() {
            None => self.into_stream().boxed(),
            Some(interval) => self.into_stream().throttle(interval).boxed(),
        }
    }

    fn record_lag(&mut self, skipped: u64) {
        self.dropped += skipped;
        warn!(skipped, total_dropped = self.dropped, "Subscriber lagging, oldest samples dropped");
    }
}
