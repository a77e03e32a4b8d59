//! Core types for telemetry data representation.
//!
//! ## Architecture
//!
//! - [`TelemetrySample`] is one decoded record: 66 `f32` values
//! - [`LAYOUT`] describes where each value lives on the wire, one
//!   [`FieldInfo`] per field
//! - [`UpdateRate`] controls how often a subscriber receives samples
//!
//! The struct and the layout table are generated from the same field list,
//! so they cannot disagree about field order.
//!
//! ## Usage Example
//!
//! ```rust
//! use rallywire::types::{RECORD_SIZE, TelemetrySample, field_info};
//!
//! let speed = field_info("Speed").unwrap();
//! assert_eq!(speed.offset, 28);
//!
//! let mut record = vec![0u8; RECORD_SIZE];
//! record[speed.range()].copy_from_slice(&42.0f32.to_le_bytes());
//!
//! let sample = TelemetrySample::from_bytes(&record).unwrap();
//! assert_eq!(sample.field("Speed"), Some(42.0));
//! ```

mod layout;
mod sample;
mod update_rate;

pub use layout::{F32_WIDTH, FieldInfo, LAYOUT, RECORD_SIZE, field_info};
pub use sample::{FIELD_COUNT, TelemetrySample};
pub use update_rate::UpdateRate;
