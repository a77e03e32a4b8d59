//! Test utilities for building telemetry records and driving the receiver
//!
//! Available to unit tests and, behind the `benchmark` feature, to the
//! criterion benches.

#![cfg(any(test, feature = "benchmark"))]

use std::io;

use tokio::sync::mpsc;

use crate::codec::WireValue;
use crate::source::DatagramSource;
use crate::types::{RECORD_SIZE, TelemetrySample, field_info};

/// Build a 264-byte record with the given fields set and every other field zero.
///
/// # Panics
///
/// Panics if a name is not a known wire field name.
pub fn record_bytes(fields: &[(&str, f32)]) -> Vec<u8> {
    let mut record = vec![0u8; RECORD_SIZE];
    for (name, value) in fields {
        let info = field_info(name).unwrap_or_else(|| panic!("unknown telemetry field '{name}'"));
        value.write(&mut record, info).expect("record is full size");
    }
    record
}

/// A plausible mid-stage sample, with `time` as given.
pub fn stage_sample(time: f32) -> TelemetrySample {
    TelemetrySample {
        time,
        lap_time: time,
        lap_distance: time * 25.0,
        speed: 25.0,
        throttle: 0.8,
        steer: -0.1,
        gear: 3.0,
        engine_rate: 620.0,
        brakes_temp_fl: 310.0,
        brakes_temp_fr: 305.0,
        track_length: 9800.0,
        max_rpm: 760.0,
        idle_rpm: 90.0,
        max_gears: 6.0,
        ..Default::default()
    }
}

/// In-memory datagram source fed from a [`ScriptedFeed`].
///
/// When the feed is dropped the source blocks forever, like a socket that
/// stopped receiving traffic.
pub struct ScriptedSource {
    incoming: mpsc::UnboundedReceiver<io::Result<Vec<u8>>>,
}

/// Sending half of a [`ScriptedSource`].
#[derive(Clone)]
pub struct ScriptedFeed {
    outgoing: mpsc::UnboundedSender<io::Result<Vec<u8>>>,
}

impl ScriptedSource {
    /// Create a source and the feed that drives it.
    pub fn channel() -> (Self, ScriptedFeed) {
        let (outgoing, incoming) = mpsc::unbounded_channel();
        (Self { incoming }, ScriptedFeed { outgoing })
    }
}

impl ScriptedFeed {
    /// Queue a datagram payload.
    pub fn datagram(&self, payload: impl Into<Vec<u8>>) {
        let _ = self.outgoing.send(Ok(payload.into()));
    }

    /// Queue a receive error.
    pub fn error(&self, error: io::Error) {
        let _ = self.outgoing.send(Err(error));
    }

    /// Whether the source has been dropped.
    pub fn is_released(&self) -> bool {
        self.outgoing.is_closed()
    }
}

#[async_trait::async_trait]
impl DatagramSource for ScriptedSource {
    async fn recv_datagram(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.incoming.recv().await {
            Some(Ok(payload)) => {
                let len = payload.len().min(buf.len());
                buf[..len].copy_from_slice(&payload[..len]);
                Ok(len)
            }
            Some(Err(error)) => Err(error),
            None => std::future::pending().await,
        }
    }
}
