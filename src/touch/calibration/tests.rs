use super::*;
use crate::touch::config::CYCLE_PERIOD_MS;

const ANCHORS: [DisplayPoint; 3] = [
    DisplayPoint::new(10, 10),
    DisplayPoint::new(300, 10),
    DisplayPoint::new(10, 300),
];

fn reading(x: u16, y: u16, pressed: bool) -> TouchReading {
    TouchReading {
        x,
        y,
        pressure: if pressed { 400 } else { 0 },
        pressed,
    }
}

struct Driver {
    engine: CalibrationEngine,
    now_ms: u64,
}

impl Driver {
    fn new() -> Self {
        Self {
            engine: CalibrationEngine::new(ANCHORS, 1_024),
            now_ms: 0,
        }
    }

    fn tick(&mut self, reading: TouchReading) -> CalibrationOutput {
        self.now_ms += CYCLE_PERIOD_MS;
        self.engine.tick(self.now_ms, reading)
    }

    /// Entry cycle, press edge, one held cycle, release.
    fn tap(&mut self, x: u16, y: u16) -> CalibrationOutput {
        self.tick(reading(x, y, false));
        self.tick(reading(x, y, true));
        self.tick(reading(x, y, true));
        self.tick(reading(x, y, false))
    }
}

#[test]
fn idle_engine_ignores_touches() {
    let mut driver = Driver::new();

    let out = driver.tick(reading(100, 100, true));

    assert!(out.actions.is_empty());
    assert_eq!(out.phase, CalibrationPhase::Idle);
    assert!(!driver.engine.is_complete());
}

#[test]
fn request_starts_acquisition_on_next_step() {
    let mut driver = Driver::new();
    assert_eq!(driver.engine.request(), Ok(()));
    assert!(driver.engine.is_requested());

    let out = driver.tick(reading(0, 0, false));

    assert_eq!(out.phase, CalibrationPhase::AcquireP1);
    assert!(out.actions.is_empty());
    assert!(driver.engine.is_in_progress());
    assert!(!driver.engine.is_requested());
}

#[test]
fn first_acquisition_step_clears_screen_and_shows_marker() {
    let mut driver = Driver::new();
    driver.engine.request().ok();
    driver.tick(reading(0, 0, false));

    let out = driver.tick(reading(0, 0, false));

    assert_eq!(
        out.actions.as_slice(),
        &[
            CalibrationAction::ClearScreen,
            CalibrationAction::ShowMarker(ANCHORS[0]),
        ]
    );
    assert!(driver.engine.timer().first_entry());
}

#[test]
fn press_on_entry_step_is_not_counted() {
    let mut driver = Driver::new();
    driver.engine.request().ok();
    driver.tick(reading(0, 0, false));

    driver.tick(reading(100, 100, true));
    let out = driver.tick(reading(100, 100, false));

    assert!(out.actions.is_empty());
    assert_eq!(out.phase, CalibrationPhase::AcquireP1);
    assert_eq!(driver.engine.captured_points()[0], TouchPoint::default());
}

#[test]
fn full_walk_solves_coefficients() {
    let mut driver = Driver::new();
    driver.engine.request().ok();
    driver.tick(reading(0, 0, false));

    let p1 = driver.tap(100, 100);
    assert_eq!(p1.actions.as_slice(), &[CalibrationAction::HideMarker(ANCHORS[0])]);
    assert_eq!(p1.phase, CalibrationPhase::AcquireP2);

    let p2_entry = driver.tick(reading(100, 100, false));
    assert_eq!(
        p2_entry.actions.as_slice(),
        &[CalibrationAction::ShowMarker(ANCHORS[1])]
    );
    driver.tick(reading(2_000, 100, true));
    driver.tick(reading(2_000, 100, true));
    let p2 = driver.tick(reading(2_000, 100, false));
    assert_eq!(p2.phase, CalibrationPhase::AcquireP3);

    let p3 = driver.tap(100, 2_000);
    assert_eq!(p3.phase, CalibrationPhase::ComputeFactors);
    assert!(driver.engine.is_in_progress());

    let done = driver.tick(reading(100, 2_000, false));
    let expected = CalibrationCoefficients::new([
        3_610_000,
        551_000,
        0,
        -19_000_000,
        0,
        551_000,
        -19_000_000,
    ]);
    assert_eq!(done.actions.as_slice(), &[CalibrationAction::Completed(expected)]);
    assert_eq!(done.phase, CalibrationPhase::Idle);
    assert!(driver.engine.is_complete());
    assert!(!driver.engine.is_in_progress());
    assert_eq!(driver.engine.coefficients(), expected);
    assert_eq!(
        driver.engine.captured_points(),
        [
            TouchPoint::new(100, 100),
            TouchPoint::new(2_000, 100),
            TouchPoint::new(100, 2_000),
        ]
    );
    assert_eq!(driver.engine.anchors(), ANCHORS);
    let anchors = driver.engine.anchors();
    for (touch, anchor) in driver.engine.captured_points().into_iter().zip(anchors) {
        assert_eq!(expected.map(touch), Ok(anchor));
    }
}

#[test]
fn captured_point_is_position_at_release() {
    let mut driver = Driver::new();
    driver.engine.request().ok();
    driver.tick(reading(0, 0, false));
    driver.tick(reading(0, 0, false));

    driver.tick(reading(90, 95, true));
    driver.tick(reading(100, 104, true));
    driver.tick(reading(112, 118, true));
    driver.tick(reading(112, 118, false));

    assert_eq!(driver.engine.captured_points()[0], TouchPoint::new(112, 118));
}

#[test]
fn request_during_calibration_is_rejected() {
    let mut driver = Driver::new();
    let injected = CalibrationCoefficients::new([1, 1, 0, 0, 0, 1, 0]);
    assert_eq!(driver.engine.set_coefficients(injected), Ok(()));
    driver.engine.request().ok();
    driver.tick(reading(0, 0, false));

    assert_eq!(
        driver.engine.request(),
        Err(TouchError::CalibrationInProgress)
    );
    assert_eq!(driver.engine.coefficients(), injected);
    assert!(!driver.engine.is_complete());
}

#[test]
fn injection_marks_calibrated() {
    let mut engine = CalibrationEngine::new(ANCHORS, 1_024);
    let k = CalibrationCoefficients::new([2, 1, 0, 0, 0, 1, 0]);

    assert_eq!(engine.set_coefficients(k), Ok(()));

    assert!(engine.is_complete());
    assert_eq!(engine.coefficients(), k);
}

#[test]
fn injection_with_zero_denominator_is_rejected() {
    let mut engine = CalibrationEngine::new(ANCHORS, 1_024);

    assert_eq!(
        engine.set_coefficients(CalibrationCoefficients::new([0, 1, 0, 0, 0, 1, 0])),
        Err(TouchError::NumericFault(NumericFault::ZeroDenominator))
    );
    assert!(!engine.is_complete());
}

#[test]
fn injection_during_calibration_is_rejected() {
    let mut driver = Driver::new();
    driver.engine.request().ok();
    driver.tick(reading(0, 0, false));

    assert_eq!(
        driver
            .engine
            .set_coefficients(CalibrationCoefficients::new([1, 1, 0, 0, 0, 1, 0])),
        Err(TouchError::CalibrationInProgress)
    );
}

#[test]
fn degenerate_capture_returns_to_idle_uncalibrated() {
    let mut driver = Driver::new();
    driver.engine.request().ok();
    driver.tick(reading(0, 0, false));

    driver.tap(500, 500);
    driver.tap(500, 500);
    driver.tap(500, 500);
    let out = driver.tick(reading(500, 500, false));

    assert_eq!(
        out.actions.as_slice(),
        &[CalibrationAction::Failed(NumericFault::DegenerateCalibration {
            determinant: 0
        })]
    );
    assert_eq!(out.phase, CalibrationPhase::Idle);
    assert!(!driver.engine.is_complete());
    assert!(!driver.engine.is_in_progress());
    assert_eq!(driver.engine.request(), Ok(()));
}

#[test]
fn timer_resets_on_phase_change_and_saturates() {
    let mut timer = StateTimer::default();

    assert!(timer.observe(CalibrationPhase::Idle, 5));
    assert_eq!(timer.elapsed_ms(), 0);
    assert!(!timer.observe(CalibrationPhase::Idle, 15));
    assert_eq!(timer.elapsed_ms(), 10);

    timer.observe(CalibrationPhase::Idle, 5_000_000);
    assert_eq!(timer.elapsed_ms(), STATE_DURATION_LIMIT_MS);

    assert!(timer.observe(CalibrationPhase::AcquireP1, 5_000_010));
    assert_eq!(timer.elapsed_ms(), 0);
    assert!(!timer.observe(CalibrationPhase::AcquireP1, 5_000_020));
}
