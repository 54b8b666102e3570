use crate::drivers::xpt2046::{ReferenceMode, Resolution};

use super::types::DisplayPoint;

pub const FILTER_WINDOW_SAMPLES: usize = 8;
/// Intended spacing between `run_cycle` calls.
pub const CYCLE_PERIOD_MS: u64 = 10;
pub const STATE_DURATION_LIMIT_MS: u64 = 1_000_000;
pub const MARKER_RADIUS_PX: u32 = 5;
// Smallest |k0| accepted from the solver; below this the points are
// treated as collinear.
pub const MIN_CALIBRATION_DETERMINANT: i64 = 1_024;
pub const DISPLAY_WIDTH: u16 = 480;
pub const DISPLAY_HEIGHT: u16 = 320;

const ANCHOR_INSET_PX: i64 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchConfig {
    pub display_max_x: u16,
    pub display_max_y: u16,
    pub anchors: [DisplayPoint; 3],
    pub marker_radius_px: u32,
    pub filter_enabled: bool,
    pub resolution: Resolution,
    pub reference: ReferenceMode,
    pub min_determinant: i64,
}

impl TouchConfig {
    pub const fn new() -> Self {
        let max_x = DISPLAY_WIDTH - 1;
        let max_y = DISPLAY_HEIGHT - 1;
        Self {
            display_max_x: max_x,
            display_max_y: max_y,
            anchors: [
                DisplayPoint::new(ANCHOR_INSET_PX, ANCHOR_INSET_PX),
                DisplayPoint::new(max_x as i64 - ANCHOR_INSET_PX, max_y as i64 / 2),
                DisplayPoint::new(max_x as i64 / 2, max_y as i64 - ANCHOR_INSET_PX),
            ],
            marker_radius_px: MARKER_RADIUS_PX,
            filter_enabled: true,
            resolution: Resolution::Bits12,
            reference: ReferenceMode::Differential,
            min_determinant: MIN_CALIBRATION_DETERMINANT,
        }
    }

    pub const fn with_anchors(self, anchors: [DisplayPoint; 3]) -> Self {
        Self { anchors, ..self }
    }

    pub const fn with_filter(self, filter_enabled: bool) -> Self {
        Self {
            filter_enabled,
            ..self
        }
    }
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self::new()
    }
}
