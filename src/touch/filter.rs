use heapless::HistoryBuffer;

use super::{config::FILTER_WINDOW_SAMPLES, types::RawSample};

/// Moving average over the last `N` samples of each channel.
///
/// History starts zeroed. On a touch-down edge every slot of every channel
/// is refilled with the incoming sample, so the first output after
/// touch-down equals the raw input. Released samples leave the history
/// alone and repeat the last output.
pub struct NoiseFilter<const N: usize = FILTER_WINDOW_SAMPLES> {
    x: HistoryBuffer<u16, N>,
    y: HistoryBuffer<u16, N>,
    pressure: HistoryBuffer<u16, N>,
    last: RawSample,
}

impl<const N: usize> NoiseFilter<N> {
    pub fn new() -> Self {
        Self {
            x: HistoryBuffer::new_with(0),
            y: HistoryBuffer::new_with(0),
            pressure: HistoryBuffer::new_with(0),
            last: RawSample::default(),
        }
    }

    pub fn filter(&mut self, sample: RawSample) -> RawSample {
        if !sample.pressed {
            self.last = self.last.released();
            return self.last;
        }
        if !self.last.pressed {
            self.x.clear_with(sample.x);
            self.y.clear_with(sample.y);
            self.pressure.clear_with(sample.pressure);
        }

        self.last = RawSample {
            x: push_average(&mut self.x, sample.x),
            y: push_average(&mut self.y, sample.y),
            pressure: push_average(&mut self.pressure, sample.pressure),
            pressed: true,
        };
        self.last
    }
}

impl<const N: usize> Default for NoiseFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn push_average<const N: usize>(history: &mut HistoryBuffer<u16, N>, value: u16) -> u16 {
    history.write(value);
    let sum: u32 = history.as_slice().iter().map(|&v| u32::from(v)).sum();
    // Mean of u16 values fits u16.
    (sum / N as u32) as u16
}
