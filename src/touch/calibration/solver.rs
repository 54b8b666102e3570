use crate::touch::{
    mapper::CalibrationCoefficients,
    types::{DisplayPoint, NumericFault, TouchPoint},
};

/// Closed-form three-point solve for the affine coefficients.
///
/// `k0` is the determinant of the touch-point system; `k1..=k3` and
/// `k4..=k6` are the Cramer numerators for display X and Y. Products are
/// formed in `i64`. When any coefficient is too wide for `i32`, all seven
/// are shifted right by the same amount; the common scale cancels in the
/// mapping, which stays within a pixel. A `|k0|` below `min_determinant`
/// means the touch points are collinear or nearly so.
pub fn solve(
    display: &[DisplayPoint; 3],
    touch: &[TouchPoint; 3],
    min_determinant: i64,
) -> Result<CalibrationCoefficients, NumericFault> {
    let [d0, d1, d2] = *display;
    let [t0, t1, t2] = *touch;

    let k0 = (t0.x - t2.x) * (t1.y - t2.y) - (t1.x - t2.x) * (t0.y - t2.y);
    if k0.unsigned_abs() < min_determinant.unsigned_abs() || k0 == 0 {
        return Err(NumericFault::DegenerateCalibration { determinant: k0 });
    }

    let numerators = |p0: i64, p1: i64, p2: i64| {
        let a = (p0 - p2) * (t1.y - t2.y) - (p1 - p2) * (t0.y - t2.y);
        let b = (t0.x - t2.x) * (p1 - p2) - (p0 - p2) * (t1.x - t2.x);
        let c = t0.y * (t2.x * p1 - t1.x * p2)
            + t1.y * (t0.x * p2 - t2.x * p0)
            + t2.y * (t1.x * p0 - t0.x * p1);
        [a, b, c]
    };
    let [k1, k2, k3] = numerators(d0.x, d1.x, d2.x);
    let [k4, k5, k6] = numerators(d0.y, d1.y, d2.y);

    let wide = [k0, k1, k2, k3, k4, k5, k6];
    let shift = wide
        .iter()
        .map(|&v| signed_bits(v))
        .max()
        .unwrap_or(0)
        .saturating_sub(i32::BITS);
    // Scaling must not erase the denominator.
    if (k0 >> shift).unsigned_abs() < min_determinant.unsigned_abs().max(1) {
        return Err(NumericFault::CoefficientOverflow);
    }
    if shift > 0 {
        log::debug!("calibration: coefficients scaled down by 2^{}", shift);
    }

    let mut k = [0i32; 7];
    for (slot, value) in k.iter_mut().zip(wide) {
        *slot = i32::try_from(value >> shift).map_err(|_| NumericFault::CoefficientOverflow)?;
    }
    Ok(CalibrationCoefficients::new(k))
}

/// Bits needed to hold `value` as two's complement, sign bit included.
fn signed_bits(value: i64) -> u32 {
    let magnitude = if value < 0 { !value } else { value };
    i64::BITS - magnitude.leading_zeros() + 1
}
