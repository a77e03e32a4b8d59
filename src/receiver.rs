//! Datagram receive loop
//!
//! The [`Receiver`] owns a [`DatagramSource`], decodes every datagram it
//! pulls and publishes successful decodes to a [`Distributor`]. Receive
//! errors and malformed datagrams are logged, counted and skipped; only
//! cancellation ends the loop.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::TelemetryError;
use crate::codec::decode_sample;
use crate::distributor::Distributor;
use crate::source::DatagramSource;
use crate::types::RECORD_SIZE;

/// Size of the receive buffer. Records are [`RECORD_SIZE`] bytes; anything
/// beyond this is truncated by the socket.
pub const RECV_BUFFER_SIZE: usize = 2048;

const _: () = assert!(RECV_BUFFER_SIZE >= RECORD_SIZE);

/// Consecutive receive errors tolerated before backing off between reads.
const ERROR_BACKOFF_THRESHOLD: u32 = 3;

/// Upper bound for the backoff between failing reads.
const MAX_ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// Where the receive loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ReceiverState {
    /// Created, loop not started yet
    Idle,
    /// Waiting for a datagram
    Listening,
    /// Decoding and publishing a datagram
    Decoding,
    /// Loop exited and the source was released
    Stopped,
}

/// Counters reported when the receive loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ReceiverStats {
    /// Datagrams read from the source
    pub datagrams: u64,
    /// Samples decoded and handed to the distributor
    pub published: u64,
    /// Datagrams dropped because they did not decode
    pub decode_failures: u64,
    /// Failed reads from the source
    pub receive_errors: u64,
}

/// Receive loop over a datagram source.
pub struct Receiver<S> {
    source: S,
    distributor: Distributor,
    cancel: CancellationToken,
    state: watch::Sender<ReceiverState>,
    buffer: Box<[u8]>,
    stats: ReceiverStats,
}

impl<S: DatagramSource> Receiver<S> {
    /// Create a receiver publishing to `distributor` until `cancel` fires.
    pub fn new(source: S, distributor: Distributor, cancel: CancellationToken) -> Self {
        let (state, _) = watch::channel(ReceiverState::Idle);
        Self {
            source,
            distributor,
            cancel,
            state,
            buffer: vec![0u8; RECV_BUFFER_SIZE].into_boxed_slice(),
            stats: ReceiverStats::default(),
        }
    }

    /// Watch the loop's state transitions.
    pub fn state(&self) -> watch::Receiver<ReceiverState> {
        self.state.subscribe()
    }

    /// Run until cancelled, then release the source.
    pub async fn run(mut self) -> ReceiverStats {
        self.state.send_replace(ReceiverState::Listening);
        info!(local_addr = ?self.source.local_addr(), "Listening for telemetry");

        let mut error_streak = 0u32;

        loop {
            let received = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                received = self.source.recv_datagram(&mut self.buffer) => received,
            };

            match received {
                Ok(len) => {
                    error_streak = 0;
                    self.handle_datagram(len);
                }
                Err(e) => {
                    error_streak += 1;
                    self.stats.receive_errors += 1;
                    let error = TelemetryError::receive_failed(e);
                    warn!(error_streak, "{}: {}", error, error_source(&error));

                    if error_streak >= ERROR_BACKOFF_THRESHOLD {
                        let backoff = error_backoff(error_streak);
                        debug!(?backoff, "Backing off after repeated receive errors");
                        tokio::select! {
                            biased;
                            _ = self.cancel.cancelled() => break,
                            _ = tokio::time::sleep(backoff) => {}
                        }
                    }
                }
            }
        }

        let Receiver { source, state, stats, .. } = self;
        drop(source);
        state.send_replace(ReceiverState::Stopped);

        info!(
            datagrams = stats.datagrams,
            published = stats.published,
            decode_failures = stats.decode_failures,
            receive_errors = stats.receive_errors,
            "Telemetry receiver stopped"
        );
        stats
    }

    fn handle_datagram(&mut self, len: usize) {
        self.stats.datagrams += 1;
        self.state.send_replace(ReceiverState::Decoding);

        match decode_sample(&self.buffer[..len]) {
            Ok(sample) => {
                let subscribers = self.distributor.publish(sample);
                self.stats.published += 1;
                trace!(time = sample.time, subscribers, "Sample published");
            }
            Err(e) => {
                self.stats.decode_failures += 1;
                let error = TelemetryError::from(e);
                debug!(len, "Dropping datagram: {}", error);
            }
        }

        self.state.send_replace(ReceiverState::Listening);
    }
}

/// Exponential backoff once the error streak passes the threshold: 50ms,
/// 100ms, 200ms, capped at [`MAX_ERROR_BACKOFF`].
fn error_backoff(error_streak: u32) -> Duration {
    let exponent = error_streak.saturating_sub(ERROR_BACKOFF_THRESHOLD).min(5);
    Duration::from_millis(50 * (1 << exponent)).min(MAX_ERROR_BACKOFF)
}

fn error_source(error: &TelemetryError) -> String {
    std::error::Error::source(error).map(ToString::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedSource, record_bytes};
    use std::io;

    fn spawn_receiver(
        source: ScriptedSource,
        distributor: &Distributor,
    ) -> (CancellationToken, watch::Receiver<ReceiverState>, tokio::task::JoinHandle<ReceiverStats>)
    {
        let cancel = CancellationToken::new();
        let receiver = Receiver::new(source, distributor.clone(), cancel.clone());
        let state = receiver.state();
        (cancel, state, tokio::spawn(receiver.run()))
    }

    #[test]
    fn backoff_grows_and_caps() {
        assert_eq!(error_backoff(3), Duration::from_millis(50));
        assert_eq!(error_backoff(4), Duration::from_millis(100));
        assert_eq!(error_backoff(5), Duration::from_millis(200));
        assert_eq!(error_backoff(6), Duration::from_millis(400));
        assert_eq!(error_backoff(7), MAX_ERROR_BACKOFF);
        assert_eq!(error_backoff(100), MAX_ERROR_BACKOFF);
    }

    #[tokio::test]
    async fn decoded_samples_are_published_in_order() {
        let (source, feed) = ScriptedSource::channel();
        let distributor = Distributor::new(16);
        let mut subscription = distributor.subscribe();
        let (cancel, _state, task) = spawn_receiver(source, &distributor);

        for time in 1..=5 {
            feed.datagram(record_bytes(&[("Time", time as f32)]));
        }

        for time in 1..=5 {
            assert_eq!(subscription.recv().await.map(|s| s.time), Some(time as f32));
        }

        cancel.cancel();
        let stats = task.await.unwrap();
        assert_eq!(stats.datagrams, 5);
        assert_eq!(stats.published, 5);
    }

    #[tokio::test]
    async fn malformed_and_failed_reads_do_not_stop_the_loop() {
        let (source, feed) = ScriptedSource::channel();
        let distributor = Distributor::new(16);
        let mut subscription = distributor.subscribe();
        let (cancel, _state, task) = spawn_receiver(source, &distributor);

        feed.datagram(record_bytes(&[("Time", 1.0)]));
        feed.datagram(vec![0u8; 12]);
        feed.error(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away"));
        feed.datagram(record_bytes(&[("Time", 2.0)]));
        feed.datagram(Vec::new());
        feed.datagram(record_bytes(&[("Time", 3.0)]));

        for time in 1..=3 {
            assert_eq!(subscription.recv().await.map(|s| s.time), Some(time as f32));
        }

        cancel.cancel();
        let stats = task.await.unwrap();
        assert_eq!(
            stats,
            ReceiverStats { datagrams: 5, published: 3, decode_failures: 2, receive_errors: 1 }
        );
        assert!(subscription.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_errors_back_off_but_keep_reading() {
        let (source, feed) = ScriptedSource::channel();
        let distributor = Distributor::new(16);
        let mut subscription = distributor.subscribe();
        let (cancel, _state, task) = spawn_receiver(source, &distributor);

        for _ in 0..6 {
            feed.error(io::Error::other("socket unavailable"));
        }
        feed.datagram(record_bytes(&[("Speed", 42.0)]));

        let sample = subscription.recv().await.expect("loop should survive errors");
        assert_eq!(sample.speed, 42.0);

        cancel.cancel();
        let stats = task.await.unwrap();
        assert_eq!(stats.receive_errors, 6);
        assert_eq!(stats.published, 1);
    }

    #[tokio::test]
    async fn state_transitions_to_stopped_and_releases_source() {
        let (source, feed) = ScriptedSource::channel();
        let distributor = Distributor::new(4);
        let (cancel, mut state, task) = spawn_receiver(source, &distributor);

        state.wait_for(|s| *s == ReceiverState::Listening).await.unwrap();

        cancel.cancel();
        task.await.unwrap();

        assert_eq!(*state.borrow(), ReceiverState::Stopped);
        assert!(feed.is_released());
    }

    #[tokio::test]
    async fn oversized_datagram_is_truncated_not_fatal() {
        let (source, feed) = ScriptedSource::channel();
        let distributor = Distributor::new(4);
        let mut subscription = distributor.subscribe();
        let (cancel, _state, task) = spawn_receiver(source, &distributor);

        let mut oversized = record_bytes(&[("Max_gears", 6.0)]);
        oversized.resize(RECV_BUFFER_SIZE * 4, 0xAB);
        feed.datagram(oversized);

        assert_eq!(subscription.recv().await.map(|s| s.max_gears), Some(6.0));
        cancel.cancel();
        assert_eq!(task.await.unwrap().published, 1);
    }
}
