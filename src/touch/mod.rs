pub mod calibration;
pub mod canvas;
pub mod config;
pub mod filter;
pub mod mapper;
pub mod types;

use crate::{
    drivers::xpt2046::{Channel, Sampler},
    platform::{IrqOps, SpiOps, TickOps},
};

use self::{
    calibration::{CalibrationAction, CalibrationEngine, CalibrationPhase},
    canvas::CalibrationCanvas,
    config::TouchConfig,
    filter::NoiseFilter,
    mapper::CalibrationCoefficients,
    types::{NumericFault, RawSample, TouchError, TouchPoint, TouchReading},
};

/// Owned touch pipeline: sampler, optional filter, mapper, the latest
/// published reading and the calibration engine.
///
/// [`run_cycle`](Self::run_cycle) is the periodic handler; nothing blocks
/// or spawns work.
pub struct TouchController<S, I, T> {
    sampler: Sampler<S, I>,
    ticks: T,
    config: TouchConfig,
    filter: NoiseFilter,
    calibration: CalibrationEngine,
    session: TouchReading,
    initialized: bool,
}

impl<S, I, T> TouchController<S, I, T>
where
    S: SpiOps,
    I: IrqOps,
    T: TickOps,
{
    pub fn new(bus: S, irq: I, ticks: T, config: TouchConfig) -> Self {
        Self {
            sampler: Sampler::new(bus, irq, config.reference, config.resolution),
            ticks,
            config,
            filter: NoiseFilter::new(),
            calibration: CalibrationEngine::new(config.anchors, config.min_determinant),
            session: TouchReading::default(),
            initialized: false,
        }
    }

    pub fn initialize(&mut self) -> Result<(), TouchError> {
        if self.initialized {
            log::debug!("touch: already initialized");
            return Ok(());
        }
        self.sampler.init()?;
        self.initialized = true;
        log::info!(
            "touch: initialized ({}x{}, filter={})",
            u32::from(self.config.display_max_x) + 1,
            u32::from(self.config.display_max_y) + 1,
            self.config.filter_enabled
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// One polling cycle: sample, filter, map when calibrated, publish, then
    /// step calibration and apply its display requests to `canvas`.
    ///
    /// Transport faults are absorbed by the sampler. A numeric fault from
    /// mapping or from the solver is returned after the cycle completes;
    /// on a mapping fault the published reading keeps its previous position
    /// with `pressed` cleared.
    pub fn run_cycle<C>(&mut self, canvas: &mut C) -> Result<(), TouchError>
    where
        C: CalibrationCanvas + ?Sized,
    {
        self.ensure_initialized()?;

        let mut sample = self.sampler.read_touch();
        if self.config.filter_enabled {
            sample = self.filter.filter(sample);
        }

        let mut fault = None;
        self.session = match self.map(sample) {
            Ok(reading) => reading,
            Err(err) => {
                log::warn!("touch: mapping failed: {}", err);
                fault = Some(err);
                TouchReading {
                    pressed: false,
                    ..self.session
                }
            }
        };

        let now_ms = self.ticks.now_ms();
        let output = self.calibration.tick(now_ms, self.session);
        for action in output.actions {
            match action {
                CalibrationAction::ClearScreen => canvas.clear_screen(),
                CalibrationAction::ShowMarker(center) => {
                    canvas.draw_marker(center, self.config.marker_radius_px, true)
                }
                CalibrationAction::HideMarker(center) => {
                    canvas.draw_marker(center, self.config.marker_radius_px, false)
                }
                CalibrationAction::Completed(_) => {}
                CalibrationAction::Failed(err) => fault = Some(err),
            }
        }

        match fault {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    pub fn touch(&self) -> Result<TouchReading, TouchError> {
        self.ensure_initialized()?;
        Ok(self.session)
    }

    pub fn request_calibration(&mut self) -> Result<(), TouchError> {
        self.ensure_initialized()?;
        self.calibration.request()?;
        log::info!("touch: calibration requested");
        Ok(())
    }

    pub fn is_calibrated(&self) -> Result<bool, TouchError> {
        self.ensure_initialized()?;
        Ok(self.calibration.is_complete())
    }

    pub fn set_calibration_coefficients(&mut self, k: [i32; 7]) -> Result<(), TouchError> {
        self.ensure_initialized()?;
        self.calibration.set_coefficients(CalibrationCoefficients::new(k))
    }

    pub fn calibration_coefficients(&self) -> Result<[i32; 7], TouchError> {
        self.ensure_initialized()?;
        Ok(self.calibration.coefficients().as_array())
    }

    pub fn calibration_phase(&self) -> Result<CalibrationPhase, TouchError> {
        self.ensure_initialized()?;
        Ok(self.calibration.phase())
    }

    pub fn state_elapsed_ms(&self) -> Result<u64, TouchError> {
        self.ensure_initialized()?;
        Ok(self.calibration.timer().elapsed_ms())
    }

    pub fn captured_points(&self) -> Result<[TouchPoint; 3], TouchError> {
        self.ensure_initialized()?;
        Ok(self.calibration.captured_points())
    }

    /// Battery, temperature or aux input conversion.
    pub fn read_auxiliary(&mut self, channel: Channel) -> Result<u16, TouchError> {
        self.ensure_initialized()?;
        self.sampler.read_channel(channel)
    }

    fn ensure_initialized(&self) -> Result<(), TouchError> {
        if self.initialized {
            Ok(())
        } else {
            Err(TouchError::NotInitialized)
        }
    }

    fn map(&self, sample: RawSample) -> Result<TouchReading, NumericFault> {
        let mut reading = TouchReading::from(sample);
        if !self.calibration.is_complete() {
            return Ok(reading);
        }

        let point = self.calibration.coefficients().apply(
            TouchPoint::from(reading),
            self.config.display_max_x,
            self.config.display_max_y,
        )?;
        // Clamped to the display bounds, which are u16.
        reading.x = point.x as u16;
        reading.y = point.y as u16;
        Ok(reading)
    }
}
