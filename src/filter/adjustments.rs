// SPDX-License-Identifier: GPL-3.0-only

//! Concrete color adjustments
//!
//! Every adjustment is a single-parameter filter. The shared behaviour
//! (folding, reset, control surface) lives in the blanket
//! [`ColorAdjustment`] impl; a variant only states its parameter range and
//! the matrix it produces.

use super::transform::ColorMatrix;
use super::{ColorAdjustment, ControlDescriptor};
use crate::errors::PreconditionViolation;
use serde::{Deserialize, Serialize};

/// Static description of a variant's single parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    /// Value with no visual effect
    pub neutral: f32,
}

impl ControlSpec {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// A filter driven by exactly one numeric parameter
pub trait SingleParameter {
    const SPEC: ControlSpec;

    fn value(&self) -> f32;

    /// Stores an already clamped value
    fn store(&mut self, value: f32);

    fn matrix(&self) -> ColorMatrix;
}

impl<T: SingleParameter> ColorAdjustment for T {
    fn apply_to(&self, transform: &ColorMatrix) -> ColorMatrix {
        transform.post_concat(&self.matrix())
    }

    fn reset(&mut self) -> bool {
        let changed = self.value() != T::SPEC.neutral;
        self.store(T::SPEC.neutral);
        changed
    }

    fn describe_controls(&self) -> Vec<ControlDescriptor> {
        vec![ControlDescriptor::from_spec(&T::SPEC, self.value())]
    }

    fn set_control(&mut self, key: &str, value: f32) -> Result<bool, PreconditionViolation> {
        if key != T::SPEC.key {
            return Err(PreconditionViolation::UnknownControl {
                filter: T::SPEC.label.to_string(),
                key: key.to_string(),
            });
        }
        if !value.is_finite() {
            return Err(PreconditionViolation::InvalidValue {
                key: key.to_string(),
                value,
            });
        }
        let value = T::SPEC.clamp(value);
        let changed = value != self.value();
        self.store(value);
        Ok(changed)
    }
}

/// Saturation: 1.0 identity, 0.0 grayscale, above 1.0 boosted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Saturation {
    pub saturation: f32,
}

impl Default for Saturation {
    fn default() -> Self {
        Self { saturation: 1.0 }
    }
}

impl SingleParameter for Saturation {
    // Right half of the slider covers 1.0..=4.0
    const SPEC: ControlSpec = ControlSpec {
        key: "saturation",
        label: "Saturation",
        min: 0.0,
        max: 4.0,
        neutral: 1.0,
    };

    fn value(&self) -> f32 {
        self.saturation
    }

    fn store(&mut self, value: f32) {
        self.saturation = value;
    }

    fn matrix(&self) -> ColorMatrix {
        ColorMatrix::saturation(self.saturation)
    }
}

/// Additive brightness offset on RGB
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Brightness {
    pub offset: f32,
}

impl SingleParameter for Brightness {
    const SPEC: ControlSpec = ControlSpec {
        key: "offset",
        label: "Brightness",
        min: -1.0,
        max: 1.0,
        neutral: 0.0,
    };

    fn value(&self) -> f32 {
        self.offset
    }

    fn store(&mut self, value: f32) {
        self.offset = value;
    }

    fn matrix(&self) -> ColorMatrix {
        ColorMatrix::scale([1.0; 3], self.offset)
    }
}

/// Contrast around mid-gray
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contrast {
    pub contrast: f32,
}

impl Default for Contrast {
    fn default() -> Self {
        Self { contrast: 1.0 }
    }
}

impl SingleParameter for Contrast {
    const SPEC: ControlSpec = ControlSpec {
        key: "contrast",
        label: "Contrast",
        min: 0.0,
        max: 4.0,
        neutral: 1.0,
    };

    fn value(&self) -> f32 {
        self.contrast
    }

    fn store(&mut self, value: f32) {
        self.contrast = value;
    }

    fn matrix(&self) -> ColorMatrix {
        let c = self.contrast;
        ColorMatrix::scale([c; 3], 0.5 * (1.0 - c))
    }
}

/// Color temperature shift: positive warms (more red), negative cools (more blue)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Warmth {
    pub warmth: f32,
}

/// Largest per-channel gain change at warmth = ±1.0
const WARMTH_GAIN: f32 = 0.2;

impl SingleParameter for Warmth {
    const SPEC: ControlSpec = ControlSpec {
        key: "warmth",
        label: "Warmth",
        min: -1.0,
        max: 1.0,
        neutral: 0.0,
    };

    fn value(&self) -> f32 {
        self.warmth
    }

    fn store(&mut self, value: f32) {
        self.warmth = value;
    }

    fn matrix(&self) -> ColorMatrix {
        let shift = self.warmth * WARMTH_GAIN;
        ColorMatrix::scale([1.0 + shift, 1.0, 1.0 - shift], 0.0)
    }
}

/// Sepia tone blended in by intensity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sepia {
    pub intensity: f32,
}

const SEPIA_RGB: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

impl SingleParameter for Sepia {
    const SPEC: ControlSpec = ControlSpec {
        key: "intensity",
        label: "Sepia",
        min: 0.0,
        max: 1.0,
        neutral: 0.0,
    };

    fn value(&self) -> f32 {
        self.intensity
    }

    fn store(&mut self, value: f32) {
        self.intensity = value;
    }

    fn matrix(&self) -> ColorMatrix {
        let sepia = ColorMatrix::from_rgb(SEPIA_RGB, [0.0; 3]);
        ColorMatrix::identity().lerp(&sepia, self.intensity)
    }
}
