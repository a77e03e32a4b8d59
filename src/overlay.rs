//! Overlay projection of a telemetry sample.
//!
//! The overlay front end reads a subset of the record under its own key
//! names. [`OverlayFrame`] is that subset; everything else in the record
//! (world position, fuel, tyre pressures...) is not exposed.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::TelemetrySample;

/// The fields the overlay displays, keyed the way the overlay expects.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct OverlayFrame {
    pub time: f32,
    pub lap_time: f32,
    pub lap_distance: f32,
    pub speed: f32,

    #[serde(rename = "suspensionPositionBL")]
    pub suspension_position_bl: f32,
    #[serde(rename = "suspensionPositionBR")]
    pub suspension_position_br: f32,
    #[serde(rename = "suspensionPositionFL")]
    pub suspension_position_fl: f32,
    #[serde(rename = "suspensionPositionFR")]
    pub suspension_position_fr: f32,

    #[serde(rename = "suspensionVelocityBL")]
    pub suspension_velocity_bl: f32,
    #[serde(rename = "suspensionVelocityBR")]
    pub suspension_velocity_br: f32,
    #[serde(rename = "suspensionVelocityFL")]
    pub suspension_velocity_fl: f32,
    #[serde(rename = "suspensionVelocityFR")]
    pub suspension_velocity_fr: f32,

    #[serde(rename = "wheelSpeedBL")]
    pub wheel_speed_bl: f32,
    #[serde(rename = "wheelSpeedBR")]
    pub wheel_speed_br: f32,
    #[serde(rename = "wheelSpeedFL")]
    pub wheel_speed_fl: f32,
    #[serde(rename = "wheelSpeedFR")]
    pub wheel_speed_fr: f32,

    pub throttle_position: f32,
    pub steer_position: f32,
    pub brake_position: f32,
    pub clutch_position: f32,
    pub gear: f32,
    pub gforce_lat: f32,
    pub gforce_lon: f32,
    pub lap: f32,
    /// Engine rate, reported to the overlay as `rpm`
    pub rpm: f32,

    // The overlay spells these "breaks".
    #[serde(rename = "breaksTempRL")]
    pub brakes_temp_rl: f32,
    #[serde(rename = "breaksTempRR")]
    pub brakes_temp_rr: f32,
    #[serde(rename = "breaksTempFL")]
    pub brakes_temp_fl: f32,
    #[serde(rename = "breaksTempFR")]
    pub brakes_temp_fr: f32,

    pub track_length: f32,
    pub max_rpm: f32,
    pub idle_rpm: f32,
    pub max_gears: f32,
}

impl OverlayFrame {
    /// Serialize as a single-line JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<&TelemetrySample> for OverlayFrame {
    fn from(sample: &TelemetrySample) -> Self {
        Self {
            time: sample.time,
            lap_time: sample.lap_time,
            lap_distance: sample.lap_distance,
            speed: sample.speed,
            suspension_position_bl: sample.susp_pos_bl,
            suspension_position_br: sample.susp_pos_br,
            suspension_position_fl: sample.susp_pos_fl,
            suspension_position_fr: sample.susp_pos_fr,
            suspension_velocity_bl: sample.susp_vel_bl,
            suspension_velocity_br: sample.susp_vel_br,
            suspension_velocity_fl: sample.susp_vel_fl,
            suspension_velocity_fr: sample.susp_vel_fr,
            wheel_speed_bl: sample.wheel_speed_bl,
            wheel_speed_br: sample.wheel_speed_br,
            wheel_speed_fl: sample.wheel_speed_fl,
            wheel_speed_fr: sample.wheel_speed_fr,
            throttle_position: sample.throttle,
            steer_position: sample.steer,
            brake_position: sample.brake,
            clutch_position: sample.clutch,
            gear: sample.gear,
            gforce_lat: sample.gforce_lat,
            gforce_lon: sample.gforce_lon,
            lap: sample.lap,
            rpm: sample.engine_rate,
            brakes_temp_rl: sample.brakes_temp_rl,
            brakes_temp_rr: sample.brakes_temp_rr,
            brakes_temp_fl: sample.brakes_temp_fl,
            brakes_temp_fr: sample.brakes_temp_fr,
            track_length: sample.track_length,
            max_rpm: sample.max_rpm,
            idle_rpm: sample.idle_rpm,
            max_gears: sample.max_gears,
        }
    }
}

impl From<TelemetrySample> for OverlayFrame {
    fn from(sample: TelemetrySample) -> Self {
        Self::from(&sample)
    }
}
