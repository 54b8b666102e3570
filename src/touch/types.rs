use core::fmt;

/// One polling cycle's sensor reading. While `pressed` is false the
/// coordinates and pressure repeat the last pressed reading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    pub x: u16,
    pub y: u16,
    pub pressure: u16,
    pub pressed: bool,
}

impl RawSample {
    pub const fn released(self) -> Self {
        Self {
            pressed: false,
            ..self
        }
    }
}

/// Latest reading published to the application, in display pixels once a
/// calibration is applied and in raw sensor units before that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchReading {
    pub x: u16,
    pub y: u16,
    pub pressure: u16,
    pub pressed: bool,
}

impl From<RawSample> for TouchReading {
    fn from(sample: RawSample) -> Self {
        Self {
            x: sample.x,
            y: sample.y,
            pressure: sample.pressure,
            pressed: sample.pressed,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayPoint {
    pub x: i64,
    pub y: i64,
}

impl DisplayPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Position in raw sensor units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: i64,
    pub y: i64,
}

impl TouchPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<TouchReading> for TouchPoint {
    fn from(reading: TouchReading) -> Self {
        Self {
            x: i64::from(reading.x),
            y: i64::from(reading.y),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericFault {
    /// Captured points are collinear or too close together.
    DegenerateCalibration { determinant: i64 },
    /// A coefficient does not fit the stored 32-bit width.
    CoefficientOverflow,
    /// Mapping with a zero `k0`.
    ZeroDenominator,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchError {
    NotInitialized,
    CalibrationInProgress,
    TransportFault,
    NumericFault(NumericFault),
}

impl From<NumericFault> for TouchError {
    fn from(fault: NumericFault) -> Self {
        TouchError::NumericFault(fault)
    }
}

impl fmt::Display for NumericFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericFault::DegenerateCalibration { determinant } => {
                write!(f, "calibration points degenerate (k0={determinant})")
            }
            NumericFault::CoefficientOverflow => f.write_str("calibration coefficient overflow"),
            NumericFault::ZeroDenominator => f.write_str("calibration denominator is zero"),
        }
    }
}

impl fmt::Display for TouchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TouchError::NotInitialized => f.write_str("touch controller not initialized"),
            TouchError::CalibrationInProgress => f.write_str("calibration already in progress"),
            TouchError::TransportFault => f.write_str("touch transport fault"),
            TouchError::NumericFault(fault) => write!(f, "numeric fault: {fault}"),
        }
    }
}
