//! US EPA Air Quality Index conversion for PM2.5
//!
//! The index is a piecewise-linear function of the particulate
//! concentration. Each bracket maps a concentration interval onto an index
//! interval; concentrations above the last bracket saturate at 500.

/// One row of the breakpoint table: concentration bounds (µg/m³) and the
/// index bounds they map onto.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Breakpoint {
    c_lo: f32,
    c_hi: f32,
    i_lo: i32,
    i_hi: i32,
}

impl Breakpoint {
    const fn new(c_lo: f32, c_hi: f32, i_lo: i32, i_hi: i32) -> Self {
        Self {
            c_lo,
            c_hi,
            i_lo,
            i_hi,
        }
    }

    /// Linear interpolation inside this bracket, truncated toward zero.
    ///
    /// Bounds stay `f32` so a reading equal to a breakpoint compares equal to
    /// it; the arithmetic is widened to `f64` and multiplies before dividing,
    /// which keeps the upper breakpoint exact (12.0 µg/m³ is exactly 50).
    fn interpolate(&self, concentration: f32) -> i32 {
        let span = (self.i_hi - self.i_lo) as f64;
        let (c, c_lo, c_hi) = (concentration as f64, self.c_lo as f64, self.c_hi as f64);
        let index = span * (c - c_lo) / (c_hi - c_lo) + self.i_lo as f64;
        index as i32
    }
}

/// PM2.5 breakpoints, evaluated in ascending order.
const PM25_BREAKPOINTS: [Breakpoint; 7] = [
    Breakpoint::new(0.0, 12.0, 0, 50),
    Breakpoint::new(12.0, 35.4, 50, 100),
    Breakpoint::new(35.4, 55.4, 100, 150),
    Breakpoint::new(55.4, 150.4, 150, 200),
    Breakpoint::new(150.4, 250.4, 200, 300),
    Breakpoint::new(250.4, 350.4, 300, 400),
    Breakpoint::new(350.4, 500.4, 400, 500),
];

/// Highest index the scale defines.
pub const AQI_MAX: i32 = 500;

/// Convert a PM2.5 concentration in µg/m³ to a US AQI value.
///
/// The first bracket whose upper bound is not below `concentration` is used.
/// Anything above 500.4 µg/m³ saturates at [`AQI_MAX`].
///
/// Negative concentrations are not rejected: they fall into the first
/// bracket and produce a non-positive index.
pub fn pm_to_aqi_us(concentration: f32) -> i32 {
    PM25_BREAKPOINTS
        .iter()
        .find(|bp| concentration <= bp.c_hi)
        .map_or(AQI_MAX, |bp| bp.interpolate(concentration))
}

/// EPA health category for an index value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiCategory {
    /// 0-50
    Good,
    /// 51-100
    Moderate,
    /// 101-150
    UnhealthyForSensitiveGroups,
    /// 151-200
    Unhealthy,
    /// 201-300
    VeryUnhealthy,
    /// 301 and above
    Hazardous,
}

impl AqiCategory {
    /// Classify an index value. Values below zero count as `Good`.
    pub const fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitiveGroups,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    /// Short label that fits a 64 px wide display line
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "USG",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "V.Unhlth",
            Self::Hazardous => "Hazard",
        }
    }
}
