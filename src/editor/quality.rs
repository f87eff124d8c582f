//! Frame-rate-adaptive render quality

use crate::constants;

/// Rendering detail level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityMode {
    Full,
    /// Cheap primitives: straight links, rect slots, no text
    Low,
}

/// Tracks measured frame rate and decides when to degrade rendering
///
/// The counter rises on dirty frames that miss the FPS floor while zoomed
/// out, decays when the frame rate recovers, and resets outright once the
/// scale climbs back above the threshold.
#[derive(Debug, Clone)]
pub struct RenderQuality {
    counter: u32,
    pub fps_floor: f32,
    pub scale_threshold: f32,
    pub engage_at: u32,
    pub counter_max: u32,
}

impl Default for RenderQuality {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderQuality {
    pub fn new() -> Self {
        Self {
            counter: 0,
            fps_floor: constants::quality::FPS_FLOOR,
            scale_threshold: constants::quality::LOW_SCALE,
            engage_at: constants::quality::THRESHOLD,
            counter_max: constants::quality::COUNTER_MAX,
        }
    }

    /// Feeds one rendered frame's measurements
    pub fn observe_frame(&mut self, fps: f32, scale: f32) {
        if scale >= self.scale_threshold {
            self.counter = 0;
            return;
        }
        if fps < self.fps_floor {
            self.counter = (self.counter + 1).min(self.counter_max);
        } else {
            self.counter = self.counter.saturating_sub(1);
        }
    }

    pub fn mode(&self) -> QualityMode {
        if self.counter > self.engage_at {
            QualityMode::Low
        } else {
            QualityMode::Full
        }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }
}
