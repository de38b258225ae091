//! Lucidity: the decaying resource that drives maze rotation and steering distortion
//!
//! Distortion is a pure function of the current value. The wave phase is the
//! only evolving state and only feeds the renderer hint.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::rotate_degrees;

/// Ordinal lucidity band, brightest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LucidityBand {
    /// value > 0.75
    Lucid,
    /// 0.5 < value <= 0.75
    Hazy,
    /// 0.25 < value <= 0.5
    Foggy,
    /// value <= 0.25
    Delirious,
}

impl LucidityBand {
    pub fn classify(value: f32) -> Self {
        if value > LUCID_THRESHOLD {
            LucidityBand::Lucid
        } else if value > HAZY_THRESHOLD {
            LucidityBand::Hazy
        } else if value > FOGGY_THRESHOLD {
            LucidityBand::Foggy
        } else {
            LucidityBand::Delirious
        }
    }
}

/// How steering input is scrambled at a given lucidity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlDistortion {
    pub invert_x: bool,
    pub invert_y: bool,
    /// Rotation applied after inversion, in degrees
    pub rotation_deg: f32,
}

impl ControlDistortion {
    pub const NONE: Self = Self {
        invert_x: false,
        invert_y: false,
        rotation_deg: 0.0,
    };

    /// Distortion for a lucidity value.
    ///
    /// - Lucid: none
    /// - Hazy: x inverted
    /// - Foggy: y inverted, rotation ramps 0 -> 90 degrees as the value falls to 0.25
    /// - Delirious: no inversion, rotation ramps 90 -> 180 degrees as the value
    ///   falls to 0, ending in a full inversion of both axes
    ///
    /// A single-axis flip composed with a half turn is just the other flip, so
    /// the bottom band never mixes inversion with rotation.
    pub fn for_value(value: f32) -> Self {
        let value = value.clamp(0.0, 1.0);
        match LucidityBand::classify(value) {
            LucidityBand::Lucid => Self::NONE,
            LucidityBand::Hazy => Self {
                invert_x: true,
                invert_y: false,
                rotation_deg: 0.0,
            },
            LucidityBand::Foggy => Self {
                invert_x: false,
                invert_y: true,
                rotation_deg: (HAZY_THRESHOLD - value) / (HAZY_THRESHOLD - FOGGY_THRESHOLD) * 90.0,
            },
            LucidityBand::Delirious => Self {
                invert_x: false,
                invert_y: false,
                rotation_deg: 90.0 + (FOGGY_THRESHOLD - value) / FOGGY_THRESHOLD * 90.0,
            },
        }
    }

    /// Scramble a steering vector
    pub fn apply(&self, input: Vec2) -> Vec2 {
        let mut v = input;
        if self.invert_x {
            v.x = -v.x;
        }
        if self.invert_y {
            v.y = -v.y;
        }
        rotate_degrees(v, self.rotation_deg)
    }
}

/// Renderer hint: horizontal wave applied to wall rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveEffect {
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
}

impl WaveEffect {
    /// Horizontal offset for a wall at vertical position `y`
    pub fn offset_at(&self, y: f32) -> f32 {
        ((y + self.phase) * self.frequency).sin() * self.amplitude
    }
}

/// Scalar lucidity in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lucidity {
    value: f32,
    decay: f32,
    wave_phase: f32,
}

impl Default for Lucidity {
    fn default() -> Self {
        Self::new(1.0, LUCIDITY_DECAY)
    }
}

impl Lucidity {
    pub fn new(initial: f32, decay: f32) -> Self {
        Self {
            value: clamp_unit(initial),
            decay: decay.max(0.0),
            wave_phase: 0.0,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// One step of decay, floored at 0
    pub fn update(&mut self) {
        self.value = (self.value - self.decay).max(0.0);
        self.wave_phase += WAVE_PHASE_STEP;
    }

    /// Raise the value, capped at 1
    pub fn increase(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.value = (self.value + amount).min(1.0);
        }
    }

    /// Host restore of a saved value (clamped)
    pub fn set(&mut self, value: f32) {
        self.value = clamp_unit(value);
    }

    pub fn is_depleted(&self) -> bool {
        self.value <= 0.0
    }

    pub fn band(&self) -> LucidityBand {
        LucidityBand::classify(self.value)
    }

    pub fn control_distortion(&self) -> ControlDistortion {
        ControlDistortion::for_value(self.value)
    }

    /// Distort a steering vector by the current value
    pub fn apply_distortion(&self, input: Vec2) -> Vec2 {
        self.control_distortion().apply(input)
    }

    pub fn wave(&self) -> WaveEffect {
        WaveEffect {
            amplitude: (1.0 - self.value) * WAVE_MAX_AMPLITUDE,
            frequency: WAVE_FREQUENCY,
            phase: self.wave_phase,
        }
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
