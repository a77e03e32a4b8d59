//! Fixed-layout frame codec.
//!
//! Decoding walks [`LAYOUT`] and reads each field at its documented offset,
//! so the Rust struct layout never has to match the wire layout.
//!
//! ```rust
//! use rallywire::codec::{decode_sample, encode_sample};
//! use rallywire::TelemetrySample;
//!
//! let sample = TelemetrySample { speed: 42.0, max_gears: 6.0, ..Default::default() };
//! let bytes = encode_sample(&sample);
//! assert_eq!(bytes.len(), 264);
//!
//! let decoded = decode_sample(&bytes).unwrap();
//! assert_eq!(decoded.speed, 42.0);
//! assert!(decode_sample(&bytes[..100]).is_err());
//! ```

use crate::DecodeError;
use crate::types::{FIELD_COUNT, FieldInfo, LAYOUT, RECORD_SIZE, TelemetrySample};

/// Trait for values that occupy a fixed slot in a telemetry record.
pub trait WireValue: Sized {
    /// Read this value from `data` at the field's offset.
    fn read(data: &[u8], info: &FieldInfo) -> Result<Self, DecodeError>;

    /// Write this value into `data` at the field's offset.
    fn write(&self, data: &mut [u8], info: &FieldInfo) -> Result<(), DecodeError>;
}

impl WireValue for f32 {
    fn read(data: &[u8], info: &FieldInfo) -> Result<Self, DecodeError> {
        let bytes: [u8; 4] = data
            .get(info.range())
            .and_then(|slice| slice.try_into().ok())
            .ok_or(DecodeError::FieldOutOfBounds { field: info.name, offset: info.offset })?;

        Ok(f32::from_le_bytes(bytes))
    }

    fn write(&self, data: &mut [u8], info: &FieldInfo) -> Result<(), DecodeError> {
        let slot = data
            .get_mut(info.range())
            .filter(|slot| slot.len() == 4)
            .ok_or(DecodeError::FieldOutOfBounds { field: info.name, offset: info.offset })?;

        slot.copy_from_slice(&self.to_le_bytes());
        Ok(())
    }
}

/// Decode one telemetry record from a datagram payload.
///
/// Only the leading [`RECORD_SIZE`] bytes are considered; anything after them
/// is ignored.
pub fn decode_sample(data: &[u8]) -> Result<TelemetrySample, DecodeError> {
    let record = data
        .get(..RECORD_SIZE)
        .ok_or(DecodeError::TooShort { expected: RECORD_SIZE, actual: data.len() })?;

    let mut values = [0.0f32; FIELD_COUNT];
    for (value, info) in values.iter_mut().zip(LAYOUT.iter()) {
        *value = f32::read(record, info)?;
    }

    Ok(TelemetrySample::from_values(values))
}

/// Encode a sample into its wire representation.
pub fn encode_sample(sample: &TelemetrySample) -> [u8; RECORD_SIZE] {
    let mut record = [0u8; RECORD_SIZE];
    for (value, info) in sample.values().iter().zip(LAYOUT.iter()) {
        record[info.range()].copy_from_slice(&value.to_le_bytes());
    }
    record
}

impl TelemetrySample {
    /// Decode a sample from a datagram payload. See [`decode_sample`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        decode_sample(data)
    }

    /// Wire representation of this sample. See [`encode_sample`].
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        encode_sample(self)
    }
}
