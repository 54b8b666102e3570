use super::types::DisplayPoint;

/// Display operations the calibration procedure needs.
pub trait CalibrationCanvas {
    fn clear_screen(&mut self);

    /// Filled marker centred on `center`; `visible == false` paints it in the
    /// background colour.
    fn draw_marker(&mut self, center: DisplayPoint, radius: u32, visible: bool);
}

/// Canvas that draws nothing, for headless use and cycles that cannot
/// reach the display.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCanvas;

impl CalibrationCanvas for NullCanvas {
    fn clear_screen(&mut self) {}

    fn draw_marker(&mut self, _center: DisplayPoint, _radius: u32, _visible: bool) {}
}

#[cfg(feature = "graphics")]
pub use graphics::GraphicsCanvas;

#[cfg(feature = "graphics")]
mod graphics {
    use embedded_graphics::{
        pixelcolor::PixelColor,
        prelude::*,
        primitives::{Circle, PrimitiveStyle},
    };

    use super::{CalibrationCanvas, DisplayPoint};

    /// [`CalibrationCanvas`] over any `embedded-graphics` draw target.
    pub struct GraphicsCanvas<D, C> {
        target: D,
        foreground: C,
        background: C,
    }

    impl<D, C> GraphicsCanvas<D, C>
    where
        D: DrawTarget<Color = C>,
        C: PixelColor,
    {
        pub fn new(target: D, foreground: C, background: C) -> Self {
            Self {
                target,
                foreground,
                background,
            }
        }

        pub fn target(&self) -> &D {
            &self.target
        }

        pub fn target_mut(&mut self) -> &mut D {
            &mut self.target
        }

        pub fn release(self) -> D {
            self.target
        }
    }

    impl<D, C> CalibrationCanvas for GraphicsCanvas<D, C>
    where
        D: DrawTarget<Color = C>,
        C: PixelColor,
    {
        fn clear_screen(&mut self) {
            if self.target.clear(self.background).is_err() {
                log::warn!("calibration canvas: clear failed");
            }
        }

        fn draw_marker(&mut self, center: DisplayPoint, radius: u32, visible: bool) {
            let color = if visible {
                self.foreground
            } else {
                self.background
            };
            let center = Point::new(to_i32(center.x), to_i32(center.y));
            let drawn = Circle::with_center(center, radius.saturating_mul(2).saturating_add(1))
                .into_styled(PrimitiveStyle::with_fill(color))
                .draw(&mut self.target);
            if drawn.is_err() {
                log::warn!("calibration canvas: marker draw failed at {:?}", center);
            }
        }
    }

    // Keeps the marker's bounding box far from i32 overflow.
    fn to_i32(value: i64) -> i32 {
        value.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i32
    }
}
