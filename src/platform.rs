use embedded_hal::{
    digital::{InputPin, OutputPin},
    spi::{SpiBus, SpiDevice},
};

#[cfg(all(feature = "esp-hal-runtime", target_arch = "xtensa"))]
pub mod esp;

/// Chip-select handling requested for one exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChipSelect {
    pub assert_on_entry: bool,
    pub release_on_exit: bool,
}

impl ChipSelect {
    /// Select before the first byte, release after the last one.
    pub const FRAME: Self = Self {
        assert_on_entry: true,
        release_on_exit: true,
    };
}

pub trait SpiOps {
    type Error;

    /// Full-duplex exchange; `rx` receives one byte per byte of `tx`.
    fn exchange(&mut self, tx: &[u8], rx: &mut [u8], cs: ChipSelect) -> Result<(), Self::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub trait IrqOps {
    /// True while a finger holds the panel down.
    fn touch_asserted(&mut self) -> bool;
}

pub trait TickOps {
    fn now_ms(&mut self) -> u64;
}

impl<F> TickOps for F
where
    F: FnMut() -> u64,
{
    fn now_ms(&mut self) -> u64 {
        self()
    }
}

/// `SpiDevice` drives chip select per transaction, so the flags are implied.
pub struct HalSpiDevice<S> {
    device: S,
}

impl<S> HalSpiDevice<S> {
    pub fn new(device: S) -> Self {
        Self { device }
    }

    pub fn release(self) -> S {
        self.device
    }
}

impl<S> SpiOps for HalSpiDevice<S>
where
    S: SpiDevice,
{
    type Error = S::Error;

    fn exchange(&mut self, tx: &[u8], rx: &mut [u8], _cs: ChipSelect) -> Result<(), Self::Error> {
        self.device.transfer(rx, tx)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum BusError<S, P> {
    Spi(S),
    ChipSelect(P),
}

/// Raw bus plus a dedicated, active-low chip-select pin.
pub struct HalSpiBus<B, P> {
    bus: B,
    cs: P,
}

impl<B, P> HalSpiBus<B, P>
where
    B: SpiBus,
    P: OutputPin,
{
    pub fn new(bus: B, cs: P) -> Self {
        Self { bus, cs }
    }

    pub fn release(self) -> (B, P) {
        (self.bus, self.cs)
    }
}

impl<B, P> SpiOps for HalSpiBus<B, P>
where
    B: SpiBus,
    P: OutputPin,
{
    type Error = BusError<B::Error, P::Error>;

    fn exchange(&mut self, tx: &[u8], rx: &mut [u8], cs: ChipSelect) -> Result<(), Self::Error> {
        if cs.assert_on_entry {
            self.cs.set_low().map_err(BusError::ChipSelect)?;
        }

        let transfer = self
            .bus
            .transfer(rx, tx)
            .and_then(|()| self.bus.flush())
            .map_err(BusError::Spi);

        // Release even when the transfer failed so the bus is not left selected.
        if cs.release_on_exit {
            self.cs.set_high().map_err(BusError::ChipSelect)?;
        }
        transfer
    }

    fn init(&mut self) -> Result<(), Self::Error> {
        self.cs.set_high().map_err(BusError::ChipSelect)
    }
}

pub struct HalIrq<P> {
    pin: P,
    active_high: bool,
}

impl<P> HalIrq<P>
where
    P: InputPin,
{
    /// PENIRQ straight from the chip: low while touched.
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_high: false,
        }
    }

    /// PENIRQ behind an inverter: high while touched.
    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_high: true,
        }
    }
}

impl<P> IrqOps for HalIrq<P>
where
    P: InputPin,
{
    fn touch_asserted(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => high == self.active_high,
            Err(_) => false,
        }
    }
}
