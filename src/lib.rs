//! Real-time rally telemetry over UDP.
//!
//! Rallywire listens for the fixed-layout telemetry records a racing
//! simulator sends over UDP (the Codemasters "extradata=3" format used by
//! DiRT Rally), decodes each datagram into a [`TelemetrySample`] and fans the
//! samples out to any number of subscribers.
//!
//! # Features
//!
//! - **Explicit wire layout**: 66 little-endian `f32` fields, decoded from a
//!   single table rather than a memory transmute
//! - **Fan-out**: every subscriber gets every sample, in receive order
//! - **Bounded buffering**: slow subscribers lose their oldest samples
//!   without holding anyone else up
//! - **Clean shutdown**: `stop()` returns only after the socket is released
//!
//! ## Example
//!
//! ```rust,no_run
//! use rallywire::{Rallywire, UpdateRate};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> rallywire::Result<()> {
//!     let mut listener = Rallywire::listen("127.0.0.1:20777").await?;
//!     let mut samples = listener.subscribe_with_rate(UpdateRate::Max(30));
//!
//!     while let Some(sample) = samples.next().await {
//!         println!("{:.1} km/h in gear {}", sample.speed_kph(), sample.gear);
//!     }
//!
//!     listener.stop().await?;
//!     Ok(())
//! }
//! ```

// Wire format
pub mod codec;
mod error;
pub mod types;

// Receive pipeline
pub mod distributor;
pub mod lifecycle;
pub mod receiver;
pub mod source;
pub mod stream;

// Configuration and presentation
pub mod config;
pub mod overlay;

#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

pub use error::*;
pub use types::*;

pub use codec::{decode_sample, encode_sample};
pub use config::ListenerConfig;
pub use distributor::{Distributor, Subscription};
pub use lifecycle::{ListenerHandle, TelemetryListener, shutdown_signal};
pub use overlay::OverlayFrame;
pub use receiver::{ReceiverState, ReceiverStats};
pub use source::DatagramSource;

/// Entry point for telemetry listeners.
///
/// # Examples
///
/// ```rust,no_run
/// use rallywire::Rallywire;
///
/// #[tokio::main]
/// async fn main() -> rallywire::Result<()> {
///     let mut listener = Rallywire::listen("0.0.0.0:20777").await?;
///     // Subscribe, then eventually...
///     listener.stop().await?;
///     Ok(())
/// }
/// ```
pub struct Rallywire;

impl Rallywire {
    /// Listen on `addr` with default buffering.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `addr` does not resolve to a socket address
    /// - The address is already in use or cannot be bound
    pub async fn listen(addr: impl Into<String>) -> Result<ListenerHandle> {
        TelemetryListener::start(&ListenerConfig::with_addr(addr)).await
    }

    /// Listen with an explicit configuration.
    pub async fn start(config: &ListenerConfig) -> Result<ListenerHandle> {
        TelemetryListener::start(config).await
    }
}
