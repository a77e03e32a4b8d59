//! Decoded telemetry sample

use serde::{Deserialize, Serialize};

/// Declares the sample struct together with its positional wire table.
///
/// Field order here is the wire order. Adding, removing or reordering an
/// entry changes the binary contract with the simulator.
macro_rules! telemetry_sample {
    ($( $(#[$meta:meta])* $field:ident => $wire:literal ),+ $(,)?) => {
        /// One decoded telemetry record, corresponding to one datagram.
        ///
        /// All values are passed through exactly as the simulator sent them;
        /// units follow the game (metres, metres per second, seconds, degrees
        /// Celsius, PSI).
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        #[cfg_attr(feature = "tauri", derive(specta::Type))]
        pub struct TelemetrySample {
            $( $(#[$meta])* pub $field: f32, )+
        }

        /// Wire names of every field, in wire order.
        pub(crate) const FIELD_NAMES: &[&str] = &[$($wire),+];

        impl TelemetrySample {
            /// All field values in wire order.
            pub fn values(&self) -> [f32; FIELD_COUNT] {
                [$(self.$field),+]
            }

            /// Build a sample from values in wire order.
            pub fn from_values(values: [f32; FIELD_COUNT]) -> Self {
                let [$($field),+] = values;
                Self { $($field),+ }
            }
        }
    };
}

/// Number of fields in a telemetry record.
pub const FIELD_COUNT: usize = FIELD_NAMES.len();

telemetry_sample! {
    /// Seconds since the session started
    time => "Time",
    /// Current lap time in seconds
    lap_time => "LapTime",
    /// Distance along the current lap/stage in metres
    lap_distance => "LapDistance",
    total_distance => "TotalDistance",
    /// World space position
    x => "X",
    y => "Y",
    z => "Z",
    /// Vehicle speed in metres per second
    speed => "Speed",
    /// Velocity in world space
    xv => "Xv",
    yv => "Yv",
    zv => "Zv",
    /// Roll vector
    xr => "Xr",
    yr => "Yr",
    zr => "Zr",
    /// Pitch vector
    xd => "Xd",
    yd => "Yd",
    zd => "Zd",
    susp_pos_bl => "Susp_pos_bl",
    susp_pos_br => "Susp_pos_br",
    susp_pos_fl => "Susp_pos_fl",
    susp_pos_fr => "Susp_pos_fr",
    susp_vel_bl => "Susp_vel_bl",
    susp_vel_br => "Susp_vel_br",
    susp_vel_fl => "Susp_vel_fl",
    susp_vel_fr => "Susp_vel_fr",
    wheel_speed_bl => "Wheel_speed_bl",
    wheel_speed_br => "Wheel_speed_br",
    wheel_speed_fl => "Wheel_speed_fl",
    wheel_speed_fr => "Wheel_speed_fr",
    /// Throttle pedal, 0.0 to 1.0
    throttle => "Throttle",
    /// Steering input, -1.0 (left) to 1.0 (right)
    steer => "Steer",
    /// Brake pedal, 0.0 to 1.0
    brake => "Brake",
    /// Clutch pedal, 0.0 to 1.0
    clutch => "Clutch",
    gear => "Gear",
    gforce_lat => "Gforce_lat",
    gforce_lon => "Gforce_lon",
    lap => "Lap",
    /// Engine rate as reported by the game
    engine_rate => "EngineRate",
    /// SLI Pro support flag
    sli_pro_native_support => "Sli_pro_native_support",
    /// Race position
    car_position => "Car_position",
    kers_level => "Kers_level",
    kers_max_level => "Kers_max_level",
    /// 0 = off, 1 = on
    drs => "Drs",
    /// 0 (off) to 2 (high)
    traction_control => "Traction_control",
    /// 0 (off) or 1 (on)
    anti_lock_brakes => "Anti_lock_brakes",
    fuel_in_tank => "Fuel_in_tank",
    fuel_capacity => "Fuel_capacity",
    /// 0 = none, 1 = pitting, 2 = in pit area
    in_pits => "In_pits",
    /// 0 = sector 1, 1 = sector 2, 2 = sector 3
    sector => "Sector",
    /// Time of sector 1, or 0
    sector1_time => "Sector1_time",
    /// Time of sector 2, or 0
    sector2_time => "Sector2_time",
    /// Brake temperatures in degrees Celsius
    brakes_temp_rl => "Brakes_temp_rl",
    brakes_temp_rr => "Brakes_temp_rr",
    brakes_temp_fl => "Brakes_temp_fl",
    brakes_temp_fr => "Brakes_temp_fr",
    tyre_pressure_rl => "Tyre_pressure_rl",
    tyre_pressure_rr => "Tyre_pressure_rr",
    tyre_pressure_fl => "Tyre_pressure_fl",
    tyre_pressure_fr => "Tyre_pressure_fr",
    laps_completed => "Laps_completed",
    total_laps => "Total_laps",
    /// Track or stage length in metres
    track_length => "Track_length",
    last_lap_time => "Last_lap_time",
    /// RPM at which the rev limiter kicks in
    max_rpm => "Max_rpm",
    idle_rpm => "Idle_rpm",
    /// Number of forward gears
    max_gears => "Max_gears",
}

impl TelemetrySample {
    /// Look up a field value by its wire name.
    pub fn field(&self, name: &str) -> Option<f32> {
        let index = FIELD_NAMES.iter().position(|candidate| *candidate == name)?;
        Some(self.values()[index])
    }

    /// Vehicle speed in kilometres per hour.
    pub fn speed_kph(&self) -> f32 {
        self.speed * 3.6
    }
}
