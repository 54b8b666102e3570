use super::types::{DisplayPoint, NumericFault, TouchPoint};

/// Affine transform from sensor units to display pixels.
///
/// `x = (k1*tx + k2*ty + k3) / k0`, `y = (k4*tx + k5*ty + k6) / k0`, with
/// products taken in `i64` and truncating division.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalibrationCoefficients(pub [i32; 7]);

impl CalibrationCoefficients {
    pub const fn new(k: [i32; 7]) -> Self {
        Self(k)
    }

    pub const fn as_array(&self) -> [i32; 7] {
        self.0
    }

    pub const fn denominator(&self) -> i32 {
        self.0[0]
    }

    /// Unclamped mapping.
    pub fn map(&self, touch: TouchPoint) -> Result<DisplayPoint, NumericFault> {
        let [k0, k1, k2, k3, k4, k5, k6] = self.0.map(i64::from);
        if k0 == 0 {
            return Err(NumericFault::ZeroDenominator);
        }
        Ok(DisplayPoint {
            x: (k1 * touch.x + k2 * touch.y + k3) / k0,
            y: (k4 * touch.x + k5 * touch.y + k6) / k0,
        })
    }

    /// Mapping clamped per axis to `[0, max_x]` x `[0, max_y]`.
    pub fn apply(
        &self,
        touch: TouchPoint,
        max_x: u16,
        max_y: u16,
    ) -> Result<DisplayPoint, NumericFault> {
        let point = self.map(touch)?;
        Ok(DisplayPoint {
            x: point.x.clamp(0, i64::from(max_x)),
            y: point.y.clamp(0, i64::from(max_y)),
        })
    }
}

impl From<[i32; 7]> for CalibrationCoefficients {
    fn from(k: [i32; 7]) -> Self {
        Self(k)
    }
}
