//! Visual servo control parameters
//!
//! All parameters are read from a single [`ParamTable`]. Any parameter
//! which is missing is left at its zero value (or, for the cycle period,
//! the default rate) and a warning is issued. A controller with all-zero
//! gains is valid and simply never moves the base.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;
use std::time::Duration;

// Internal
use util::params::{ParamKey, ParamTable};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Parameter prefix of the lateral (linear y) axis gains.
pub const LINEAR_Y_PREFIX: &str = "/servo_pid/linear_y";

/// Parameter prefix of the heading (angular z) axis gains.
pub const ANGULAR_Z_PREFIX: &str = "/servo_pid/angular_z";

/// Parameter prefix of the capture geometry.
pub const GEOMETRY_PREFIX: &str = "/object_tracking";

/// Key of the control cycle period.
pub const CYCLE_PERIOD_KEY: &str = "/servo_exec/cycle_period_s";

/// Default control cycle period (50 Hz).
pub const DEFAULT_CYCLE_PERIOD_S: f64 = 1.0 / 50.0;

/// Longest accepted control cycle period.
pub const MAX_CYCLE_PERIOD_S: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains and limits of a single axis controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AxisGains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Upper limit of the integral accumulation
    pub i_limit_hi: f64,

    /// Lower limit of the integral accumulation, always `-i_limit_hi`
    pub i_limit_lo: f64,

    /// Fraction of full speed the limited output is scaled by, in `[0, 1]`
    pub speed: f64,
}

/// Size of the images the tracker works on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CaptureGeometry {
    /// Image width in pixels
    pub size_x: u32,

    /// Image height in pixels
    pub size_y: u32,
}

/// All parameters of the visual servo executable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServoParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Capture geometry used to normalise tracker positions
    pub geometry: CaptureGeometry,

    /// Gains of the lateral controller
    pub linear_y: AxisGains,

    /// Gains of the heading controller
    pub angular_z: AxisGains,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AxisGains {
    /// Build a set of gains with a symmetric integral clamp.
    pub fn new(k_p: f64, k_i: f64, k_d: f64, i_clamp: f64, speed: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            i_limit_hi: i_clamp.abs(),
            i_limit_lo: -i_clamp.abs(),
            speed: speed.max(0.0).min(1.0),
        }
    }

    /// Load the gains stored under `prefix` (e.g. `/servo_pid/linear_y`).
    ///
    /// The keys used are `p`, `i`, `d`, `i_clamp` and `speed`. The loaded
    /// configuration is printed once loaded.
    pub fn from_table(table: &ParamTable, prefix: &str) -> Self {
        let prefix_key = ParamKey::new(prefix);
        let get = |suffix: &str| get_or_zero(table, &prefix_key.join(suffix));

        let i_clamp = get("i_clamp");
        if i_clamp < 0.0 {
            warn!(
                "{} is negative ({}), using its magnitude",
                prefix_key.join("i_clamp"),
                i_clamp
            );
        }

        let speed = get("speed");
        if !(0.0..=1.0).contains(&speed) {
            warn!(
                "{} should be between 0 and 1, found {}, clamping",
                prefix_key.join("speed"),
                speed
            );
        }

        let gains = Self::new(get("p"), get("i"), get("d"), i_clamp, speed);

        warn!("{} configurations below:", prefix_key);
        warn!(
            "    PID gains: [Kp, Ki, Kd] = [{:.2}, {:.2}, {:.2}]",
            gains.k_p, gains.k_i, gains.k_d
        );
        warn!(
            "    Integral [hi, lo] limits = [{:.2}, {:.2}]",
            gains.i_limit_hi, gains.i_limit_lo
        );
        warn!("    {}% speed", (gains.speed * 100.0) as i32);

        gains
    }
}

impl CaptureGeometry {
    /// Load the capture geometry (`capture_size_x`, `capture_size_y`) from
    /// under `prefix`.
    pub fn from_table(table: &ParamTable, prefix: &str) -> Self {
        let prefix_key = ParamKey::new(prefix);
        let get = |suffix: &str| {
            let key = prefix_key.join(suffix);
            match table.get::<u32>(&key) {
                Some(v) => v,
                None => {
                    warn!("Parameter {} not set, defaulting to 0", key);
                    0
                }
            }
        };

        let geometry = Self {
            size_x: get("capture_size_x"),
            size_y: get("capture_size_y"),
        };

        if geometry.half_x() == 0 || geometry.half_y() == 0 {
            warn!(
                "Capture geometry {}x{} is degenerate, positions along a zero-sized axis will \
                 be treated as centred",
                geometry.size_x, geometry.size_y
            );
        }

        geometry
    }

    /// Half the image width in whole pixels.
    pub fn half_x(&self) -> u32 {
        self.size_x / 2
    }

    /// Half the image height in whole pixels.
    pub fn half_y(&self) -> u32 {
        self.size_y / 2
    }

    /// Normalise a pixel offset from the image centre into roughly
    /// `[-1, 1]`. Returns `(x, y)`.
    pub fn normalise(&self, x: i32, y: i32) -> (f64, f64) {
        (
            util::maths::safe_div(x as f64, self.half_x() as f64),
            util::maths::safe_div(y as f64, self.half_y() as f64),
        )
    }
}

impl Default for ServoParams {
    fn default() -> Self {
        Self {
            cycle_period_s: DEFAULT_CYCLE_PERIOD_S,
            geometry: CaptureGeometry::default(),
            linear_y: AxisGains::default(),
            angular_z: AxisGains::default(),
        }
    }
}

impl ServoParams {
    /// Load all parameters from the table.
    pub fn from_table(table: &ParamTable) -> Self {
        let period_key = ParamKey::new(CYCLE_PERIOD_KEY);
        let cycle_period_s = match table.get_f64(&period_key) {
            Some(p) if p > 0.0 && p <= MAX_CYCLE_PERIOD_S => p,
            Some(p) => {
                warn!(
                    "{} must be in (0, {}] s, found {}, using {} s",
                    period_key, MAX_CYCLE_PERIOD_S, p, DEFAULT_CYCLE_PERIOD_S
                );
                DEFAULT_CYCLE_PERIOD_S
            }
            None => DEFAULT_CYCLE_PERIOD_S,
        };

        Self {
            cycle_period_s,
            geometry: CaptureGeometry::from_table(table, GEOMETRY_PREFIX),
            linear_y: AxisGains::from_table(table, LINEAR_Y_PREFIX),
            angular_z: AxisGains::from_table(table, ANGULAR_Z_PREFIX),
        }
    }

    /// The control cycle period. A period outside the accepted range gives
    /// the default.
    pub fn cycle_period(&self) -> Duration {
        if self.cycle_period_s > 0.0 && self.cycle_period_s <= MAX_CYCLE_PERIOD_S {
            Duration::from_secs_f64(self.cycle_period_s)
        } else {
            Duration::from_secs_f64(DEFAULT_CYCLE_PERIOD_S)
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn get_or_zero(table: &ParamTable, key: &ParamKey) -> f64 {
    match table.get_f64(key) {
        Some(v) => v,
        None => {
            warn!("Parameter {} not set, defaulting to 0", key);
            0.0
        }
    }
}
