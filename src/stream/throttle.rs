//! Latest-wins stream throttling

use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::debug;

/// Extension trait to add throttling to any Stream
pub trait ThrottleExt: Stream {
    /// Emit at most one item per `period`.
    ///
    /// Items arriving while the stream is waiting for the next slot replace
    /// each other; only the newest is emitted. Nothing is emitted for a
    /// period in which no item arrived.
    fn throttle(self, period: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, period)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// Stream returned by [`ThrottleExt::throttle`]
    pub struct Throttle<S: Stream> {
        #[pin]
        inner: S,
        ticks: Interval,
        latest: Option<S::Item>,
        superseded: u64,
        inner_done: bool,
    }
}

impl<S: Stream> Throttle<S> {
    /// Wrap `inner`, emitting at most once per `period`.
    pub fn new(inner: S, period: Duration) -> Self {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { inner, ticks, latest: None, superseded: 0, inner_done: false }
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        while !*this.inner_done {
            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    if this.latest.replace(item).is_some() {
                        *this.superseded += 1;
                    }
                }
                Poll::Ready(None) => {
                    *this.inner_done = true;
                    debug!(superseded = *this.superseded, "Throttled stream ended");
                }
                Poll::Pending => break,
            }
        }

        if this.latest.is_none() {
            return if *this.inner_done { Poll::Ready(None) } else { Poll::Pending };
        }

        ready!(this.ticks.poll_tick(cx));
        Poll::Ready(this.latest.take())
    }
}
