use esp_hal::time::Instant;

use super::TickOps;

/// Millisecond ticks from the esp-hal system timer.
#[derive(Clone, Copy, Default)]
pub struct EspTicks;

impl EspTicks {
    pub const fn new() -> Self {
        Self
    }
}

impl TickOps for EspTicks {
    fn now_ms(&mut self) -> u64 {
        Instant::now().duration_since_epoch().as_millis()
    }
}

/// Routes `log` output to the UART console.
pub fn init_logger(level: log::LevelFilter) {
    esp_println::logger::init_logger(level);
}
