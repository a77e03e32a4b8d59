//! Fixed wire layout of a telemetry record

use serde::Serialize;

use super::sample::{FIELD_COUNT, FIELD_NAMES};

/// Width in bytes of every field in the record.
pub const F32_WIDTH: usize = 4;

/// Total size of one telemetry record on the wire.
pub const RECORD_SIZE: usize = FIELD_COUNT * F32_WIDTH;

/// Position of one field within the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    /// Field name as documented by the simulator
    pub name: &'static str,
    /// Byte offset within the record
    pub offset: usize,
    /// Width in bytes
    pub width: usize,
}

impl FieldInfo {
    /// Byte range covered by this field.
    pub const fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.width
    }
}

/// Every field of the record, in wire order.
pub static LAYOUT: [FieldInfo; FIELD_COUNT] = build_layout();

const fn build_layout() -> [FieldInfo; FIELD_COUNT] {
    let mut fields = [FieldInfo { name: "", offset: 0, width: 0 }; FIELD_COUNT];
    let mut index = 0;
    while index < FIELD_COUNT {
        fields[index] =
            FieldInfo { name: FIELD_NAMES[index], offset: index * F32_WIDTH, width: F32_WIDTH };
        index += 1;
    }
    fields
}

/// Look up a field's position by wire name.
pub fn field_info(name: &str) -> Option<&'static FieldInfo> {
    LAYOUT.iter().find(|info| info.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn record_size_matches_protocol() {
        assert_eq!(RECORD_SIZE, 264);
    }

    #[test]
    fn layout_is_contiguous_without_padding() {
        let mut expected_offset = 0;
        for info in &LAYOUT {
            assert_eq!(info.offset, expected_offset, "gap before {}", info.name);
            assert_eq!(info.width, F32_WIDTH);
            expected_offset += info.width;
        }
        assert_eq!(expected_offset, RECORD_SIZE);
    }

    #[test]
    fn field_names_are_unique() {
        let names: HashSet<_> = LAYOUT.iter().map(|info| info.name).collect();
        assert_eq!(names.len(), FIELD_COUNT);
    }

    #[test]
    fn documented_offsets() {
        let offset = |name| field_info(name).map(|info| info.offset);
        assert_eq!(offset("Time"), Some(0));
        assert_eq!(offset("Speed"), Some(28));
        assert_eq!(offset("Throttle"), Some(116));
        assert_eq!(offset("Gear"), Some(132));
        assert_eq!(offset("EngineRate"), Some(148));
        assert_eq!(offset("Brakes_temp_rl"), Some(204));
        assert_eq!(offset("Track_length"), Some(244));
        assert_eq!(offset("Max_gears"), Some(260));
        assert_eq!(offset("Unknown"), None);
    }

    #[test]
    fn range_covers_field_bytes() {
        let speed = field_info("Speed").unwrap();
        assert_eq!(speed.range(), 28..32);
    }
}
