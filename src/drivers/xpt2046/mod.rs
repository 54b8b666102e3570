mod frame;

#[cfg(test)]
pub(crate) mod fake;

pub use frame::{
    decode_result, encode_control, encode_reply, Channel, Command, PowerMode, ReferenceMode,
    Resolution, FRAME_LEN,
};

use crate::{
    platform::{ChipSelect, IrqOps, SpiOps},
    touch::types::{RawSample, TouchError},
};

const PRESSURE_X_SPAN: f32 = 4096.0;
const PRESSURE_SCALE: f32 = 4095.0;

/// Reads position and contact pressure once per cycle and holds the last
/// pressed values while the panel is released.
pub struct Sampler<S, I> {
    bus: S,
    irq: I,
    reference: ReferenceMode,
    resolution: Resolution,
    held: RawSample,
}

impl<S, I> Sampler<S, I>
where
    S: SpiOps,
    I: IrqOps,
{
    pub fn new(bus: S, irq: I, reference: ReferenceMode, resolution: Resolution) -> Self {
        Self {
            bus,
            irq,
            reference,
            resolution,
            held: RawSample::default(),
        }
    }

    pub fn init(&mut self) -> Result<(), TouchError> {
        self.bus.init().map_err(|_| TouchError::TransportFault)
    }

    /// Four conversions while the touch line is asserted, none otherwise.
    ///
    /// Bus faults and a zero Z1 reading degrade to a released sample that
    /// carries the held coordinates.
    pub fn read_touch(&mut self) -> RawSample {
        if !self.irq.touch_asserted() {
            return self.held.released();
        }

        match self.read_pressed() {
            Ok(Some(sample)) => {
                self.held = sample;
                sample
            }
            Ok(None) => self.held.released(),
            Err(err) => {
                log::warn!("xpt2046: sample dropped: {}", err);
                self.held.released()
            }
        }
    }

    /// Single conversion of any source, e.g. battery or temperature.
    pub fn read_channel(&mut self, channel: Channel) -> Result<u16, TouchError> {
        self.convert(channel, PowerMode::PowerDown)
    }

    pub fn last_pressed(&self) -> RawSample {
        self.held
    }

    fn read_pressed(&mut self) -> Result<Option<RawSample>, TouchError> {
        let x = self.convert(Channel::XPosition, PowerMode::FullyOn)?;
        let y = self.convert(Channel::YPosition, PowerMode::FullyOn)?;
        let z1 = self.convert(Channel::Z1, PowerMode::FullyOn)?;
        let z2 = self.convert(Channel::Z2, PowerMode::ReferenceOn)?;

        let Some(pressure) = contact_pressure(x, z1, z2) else {
            log::debug!("xpt2046: z1=0, treating sample as released");
            return Ok(None);
        };

        Ok(Some(RawSample {
            x,
            y,
            pressure,
            pressed: true,
        }))
    }

    fn convert(&mut self, channel: Channel, power: PowerMode) -> Result<u16, TouchError> {
        let command = Command::conversion(channel, power, self.reference, self.resolution);
        let mut rx = [0u8; FRAME_LEN];
        self.bus
            .exchange(&command.frame(), &mut rx, ChipSelect::FRAME)
            .map_err(|_| TouchError::TransportFault)?;
        Ok(decode_result(&rx, self.resolution))
    }
}

/// `(x / 4096) * (z2 / z1 - 1) * 4095`.
///
/// Truncated toward zero rather than rounded, matching the reference
/// controller firmware. Saturates at the `u16` range; `None` when `z1` is
/// zero.
pub fn contact_pressure(x: u16, z1: u16, z2: u16) -> Option<u16> {
    if z1 == 0 {
        return None;
    }
    let ratio = f32::from(z2) / f32::from(z1);
    Some(((f32::from(x) / PRESSURE_X_SPAN) * (ratio - 1.0) * PRESSURE_SCALE) as u16)
}
