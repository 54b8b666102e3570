use core::cmp::min;

use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::{
    config::STATE_DURATION_LIMIT_MS,
    mapper::CalibrationCoefficients,
    types::{DisplayPoint, NumericFault, TouchError, TouchPoint, TouchReading},
};

mod solver;

pub use solver::solve;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CalibrationPhase {
    #[default]
    Idle,
    AcquireP1,
    AcquireP2,
    AcquireP3,
    ComputeFactors,
}

/// Side effects requested by one engine step, applied by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationAction {
    ClearScreen,
    ShowMarker(DisplayPoint),
    HideMarker(DisplayPoint),
    Completed(CalibrationCoefficients),
    Failed(NumericFault),
}

pub const MAX_ACTIONS_PER_STEP: usize = 4;

pub type CalibrationActions = heapless::Vec<CalibrationAction, MAX_ACTIONS_PER_STEP>;

#[derive(Clone, Debug, Default)]
pub struct CalibrationOutput {
    pub actions: CalibrationActions,
    pub phase: CalibrationPhase,
}

/// Time spent in the current phase.
///
/// Reset to zero with `first_entry` set on the first cycle after a phase
/// change; otherwise accumulates tick deltas, saturating at
/// [`STATE_DURATION_LIMIT_MS`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateTimer {
    phase: CalibrationPhase,
    last_tick_ms: Option<u64>,
    elapsed_ms: u64,
    first_entry: bool,
}

impl StateTimer {
    pub fn observe(&mut self, phase: CalibrationPhase, now_ms: u64) -> bool {
        match self.last_tick_ms {
            Some(last) if phase == self.phase => {
                let delta = now_ms.saturating_sub(last);
                self.elapsed_ms = min(
                    self.elapsed_ms.saturating_add(delta),
                    STATE_DURATION_LIMIT_MS,
                );
                self.first_entry = false;
            }
            _ => {
                self.phase = phase;
                self.elapsed_ms = 0;
                self.first_entry = true;
            }
        }
        self.last_tick_ms = Some(now_ms);
        self.first_entry
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn first_entry(&self) -> bool {
        self.first_entry
    }
}

#[derive(Clone, Copy, Debug)]
enum CalibrationEvent {
    Tick { now_ms: u64, reading: TouchReading },
    Request,
    Inject(CalibrationCoefficients),
}

#[derive(Default)]
struct DispatchContext {
    actions: CalibrationActions,
    rejected: Option<TouchError>,
}

impl DispatchContext {
    fn push(&mut self, action: CalibrationAction) {
        if self.actions.push(action).is_err() {
            log::warn!("calibration: action buffer full, dropped {:?}", action);
        }
    }
}

/// Interactive three-point calibration.
///
/// Idle waits for a request, each acquisition phase shows one anchor and
/// records the touch position until press-then-release, and the last phase
/// solves for the coefficients. A transition decided in one step takes
/// effect on the next; that first step in a phase only runs its entry
/// actions.
pub struct CalibrationEngine {
    machine: statig::blocking::StateMachine<CalibrationHsm>,
}

impl CalibrationEngine {
    pub fn new(anchors: [DisplayPoint; 3], min_determinant: i64) -> Self {
        Self {
            machine: CalibrationHsm::new(anchors, min_determinant).state_machine(),
        }
    }

    pub fn tick(&mut self, now_ms: u64, reading: TouchReading) -> CalibrationOutput {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&CalibrationEvent::Tick { now_ms, reading }, &mut context);
        CalibrationOutput {
            actions: context.actions,
            phase: self.phase(),
        }
    }

    pub fn request(&mut self) -> Result<(), TouchError> {
        self.dispatch(CalibrationEvent::Request)
    }

    pub fn set_coefficients(&mut self, coefficients: CalibrationCoefficients) -> Result<(), TouchError> {
        self.dispatch(CalibrationEvent::Inject(coefficients))
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.machine.inner().phase
    }

    pub fn is_requested(&self) -> bool {
        self.machine.inner().requested
    }

    pub fn is_in_progress(&self) -> bool {
        self.machine.inner().in_progress
    }

    pub fn is_complete(&self) -> bool {
        self.machine.inner().complete
    }

    pub fn coefficients(&self) -> CalibrationCoefficients {
        self.machine.inner().coefficients
    }

    pub fn anchors(&self) -> [DisplayPoint; 3] {
        self.machine.inner().anchors
    }

    pub fn captured_points(&self) -> [TouchPoint; 3] {
        self.machine.inner().captured
    }

    pub fn timer(&self) -> StateTimer {
        self.machine.inner().timer
    }

    fn dispatch(&mut self, event: CalibrationEvent) -> Result<(), TouchError> {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        match context.rejected {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct CalibrationHsm {
    anchors: [DisplayPoint; 3],
    min_determinant: i64,
    phase: CalibrationPhase,
    timer: StateTimer,
    requested: bool,
    in_progress: bool,
    complete: bool,
    point_touched: bool,
    captured: [TouchPoint; 3],
    coefficients: CalibrationCoefficients,
}

impl CalibrationHsm {
    fn new(anchors: [DisplayPoint; 3], min_determinant: i64) -> Self {
        Self {
            anchors,
            min_determinant,
            phase: CalibrationPhase::Idle,
            timer: StateTimer::default(),
            requested: false,
            in_progress: false,
            complete: false,
            point_touched: false,
            captured: [TouchPoint::default(); 3],
            coefficients: CalibrationCoefficients::default(),
        }
    }

    fn enter(&mut self, phase: CalibrationPhase) -> Outcome<State> {
        log::debug!("calibration: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        Transition(match phase {
            CalibrationPhase::Idle => State::idle(),
            CalibrationPhase::AcquireP1 => State::acquire_p1(),
            CalibrationPhase::AcquireP2 => State::acquire_p2(),
            CalibrationPhase::AcquireP3 => State::acquire_p3(),
            CalibrationPhase::ComputeFactors => State::compute_factors(),
        })
    }

    fn show_marker(&mut self, context: &mut DispatchContext, slot: usize) {
        self.point_touched = false;
        context.push(CalibrationAction::ShowMarker(self.anchors[slot]));
    }

    /// Records the current position once a press has been seen; true on
    /// the release that finalizes the point.
    fn capture(&mut self, context: &mut DispatchContext, slot: usize, reading: TouchReading) -> bool {
        if !self.point_touched {
            self.point_touched = reading.pressed;
            return false;
        }

        self.captured[slot] = TouchPoint::from(reading);
        if reading.pressed {
            return false;
        }

        log::debug!(
            "calibration: point {} captured at ({}, {})",
            slot + 1,
            reading.x,
            reading.y
        );
        context.push(CalibrationAction::HideMarker(self.anchors[slot]));
        true
    }

    fn acquire(
        &mut self,
        context: &mut DispatchContext,
        slot: usize,
        reading: TouchReading,
        next: CalibrationPhase,
    ) -> Outcome<State> {
        if self.capture(context, slot, reading) {
            self.enter(next)
        } else {
            Handled
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl CalibrationHsm {
    #[state(superstate = "session")]
    fn idle(&mut self, context: &mut DispatchContext, event: &CalibrationEvent) -> Outcome<State> {
        let _ = context;
        match event {
            CalibrationEvent::Tick { now_ms, .. } => {
                self.timer.observe(CalibrationPhase::Idle, *now_ms);
                if !self.requested {
                    return Handled;
                }
                self.requested = false;
                self.in_progress = true;
                self.complete = false;
                log::info!("calibration: started");
                self.enter(CalibrationPhase::AcquireP1)
            }
            _ => Super,
        }
    }

    #[state(superstate = "session")]
    fn acquire_p1(
        &mut self,
        context: &mut DispatchContext,
        event: &CalibrationEvent,
    ) -> Outcome<State> {
        match event {
            CalibrationEvent::Tick { now_ms, reading } => {
                if self.timer.observe(CalibrationPhase::AcquireP1, *now_ms) {
                    context.push(CalibrationAction::ClearScreen);
                    self.show_marker(context, 0);
                    return Handled;
                }
                self.acquire(context, 0, *reading, CalibrationPhase::AcquireP2)
            }
            _ => Super,
        }
    }

    #[state(superstate = "session")]
    fn acquire_p2(
        &mut self,
        context: &mut DispatchContext,
        event: &CalibrationEvent,
    ) -> Outcome<State> {
        match event {
            CalibrationEvent::Tick { now_ms, reading } => {
                if self.timer.observe(CalibrationPhase::AcquireP2, *now_ms) {
                    self.show_marker(context, 1);
                    return Handled;
                }
                self.acquire(context, 1, *reading, CalibrationPhase::AcquireP3)
            }
            _ => Super,
        }
    }

    #[state(superstate = "session")]
    fn acquire_p3(
        &mut self,
        context: &mut DispatchContext,
        event: &CalibrationEvent,
    ) -> Outcome<State> {
        match event {
            CalibrationEvent::Tick { now_ms, reading } => {
                if self.timer.observe(CalibrationPhase::AcquireP3, *now_ms) {
                    self.show_marker(context, 2);
                    return Handled;
                }
                self.acquire(context, 2, *reading, CalibrationPhase::ComputeFactors)
            }
            _ => Super,
        }
    }

    #[state(superstate = "session")]
    fn compute_factors(
        &mut self,
        context: &mut DispatchContext,
        event: &CalibrationEvent,
    ) -> Outcome<State> {
        match event {
            CalibrationEvent::Tick { now_ms, .. } => {
                self.timer
                    .observe(CalibrationPhase::ComputeFactors, *now_ms);
                match solve(&self.anchors, &self.captured, self.min_determinant) {
                    Ok(coefficients) => {
                        self.coefficients = coefficients;
                        self.complete = true;
                        log::info!("calibration: complete {:?}", coefficients.as_array());
                        context.push(CalibrationAction::Completed(coefficients));
                    }
                    Err(fault) => {
                        log::warn!("calibration: aborted, {}", fault);
                        context.push(CalibrationAction::Failed(fault));
                    }
                }
                self.in_progress = false;
                self.enter(CalibrationPhase::Idle)
            }
            _ => Super,
        }
    }

    #[superstate]
    fn session(&mut self, context: &mut DispatchContext, event: &CalibrationEvent) -> Outcome<State> {
        match event {
            CalibrationEvent::Request if self.in_progress => {
                context.rejected = Some(TouchError::CalibrationInProgress);
                Handled
            }
            CalibrationEvent::Request => {
                self.requested = true;
                self.complete = false;
                Handled
            }
            CalibrationEvent::Inject(_) if self.in_progress => {
                context.rejected = Some(TouchError::CalibrationInProgress);
                Handled
            }
            CalibrationEvent::Inject(coefficients) => {
                if coefficients.denominator() == 0 {
                    context.rejected = Some(NumericFault::ZeroDenominator.into());
                    return Handled;
                }
                self.coefficients = *coefficients;
                self.complete = true;
                log::info!("calibration: coefficients set {:?}", coefficients.as_array());
                Handled
            }
            CalibrationEvent::Tick { .. } => Handled,
        }
    }
}

#[cfg(test)]
mod tests;
