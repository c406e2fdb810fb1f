// SPDX-License-Identifier: GPL-3.0-only

//! Non-destructive color filters
//!
//! A [`Filter`] is a named instance of one of the closed set of
//! [`FilterKind`] variants. Filters are folded, in stack order, into a single
//! [`ColorMatrix`] by the [`FilterStack`](stack::FilterStack), and persisted
//! through the [`codec`].

pub mod adjustments;
pub mod codec;
pub mod stack;
pub mod transform;

pub use adjustments::{Brightness, Contrast, Saturation, Sepia, Warmth};
pub use codec::PersistedFilterRecord;
pub use stack::{FilterId, FilterStack, StackChange};
pub use transform::ColorMatrix;

use crate::constants::{SLIDER_CENTER, SLIDER_MAX};
use crate::errors::PreconditionViolation;
use adjustments::{ControlSpec, SingleParameter};
use std::fmt;
use std::str::FromStr;

/// Capability shared by every filter variant
pub trait ColorAdjustment {
    /// Fold this filter's effect into the running composite
    fn apply_to(&self, transform: &ColorMatrix) -> ColorMatrix;

    /// Restore identity parameters; returns whether anything changed
    fn reset(&mut self) -> bool;

    /// Parameters the editor should expose for this filter
    fn describe_controls(&self) -> Vec<ControlDescriptor>;

    /// Set a parameter by descriptor key; returns whether the value changed
    fn set_control(&mut self, key: &str, value: f32) -> Result<bool, PreconditionViolation>;
}

/// One adjustable parameter, independent of any widget toolkit
#[derive(Debug, Clone, PartialEq)]
pub struct ControlDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub neutral: f32,
    pub value: f32,
}

impl ControlDescriptor {
    fn from_spec(spec: &ControlSpec, value: f32) -> Self {
        Self {
            key: spec.key,
            label: spec.label,
            min: spec.min,
            max: spec.max,
            neutral: spec.neutral,
            value,
        }
    }

    /// Slider position (0..=100) for the current value
    ///
    /// The neutral value sits at the centre; each half of the slider is
    /// linear over its side of the range. Ranges whose neutral value is an
    /// endpoint use the whole slider linearly.
    pub fn slider_position(&self) -> u8 {
        let max = SLIDER_MAX as f32;
        let center = SLIDER_CENTER as f32;
        let pos = if !self.is_centered() {
            (self.value - self.min) / (self.max - self.min) * max
        } else if self.value <= self.neutral {
            (self.value - self.min) / (self.neutral - self.min) * center
        } else {
            center + (self.value - self.neutral) / (self.max - self.neutral) * (max - center)
        };
        pos.clamp(0.0, max) as u8
    }

    /// Value for a slider position (0..=100)
    pub fn value_at(&self, position: u8) -> f32 {
        let max = SLIDER_MAX as f32;
        let center = SLIDER_CENTER as f32;
        let p = (position.min(SLIDER_MAX)) as f32;
        if !self.is_centered() {
            self.min + p / max * (self.max - self.min)
        } else if p <= center {
            self.min + p / center * (self.neutral - self.min)
        } else {
            self.neutral + (p - center) / (max - center) * (self.max - self.neutral)
        }
    }

    fn is_centered(&self) -> bool {
        self.neutral > self.min && self.neutral < self.max
    }
}

/// Stable identity of a variant, used as the persisted type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterTag {
    Saturation,
    Brightness,
    Contrast,
    Warmth,
    Sepia,
}

impl FilterTag {
    pub const ALL: [FilterTag; 5] = [
        FilterTag::Saturation,
        FilterTag::Brightness,
        FilterTag::Contrast,
        FilterTag::Warmth,
        FilterTag::Sepia,
    ];

    /// Tag written to storage; never change these strings
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterTag::Saturation => "saturation",
            FilterTag::Brightness => "brightness",
            FilterTag::Contrast => "contrast",
            FilterTag::Warmth => "warmth",
            FilterTag::Sepia => "sepia",
        }
    }

    /// Default name given to new filters of this variant
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterTag::Saturation => "Saturation",
            FilterTag::Brightness => "Brightness",
            FilterTag::Contrast => "Contrast",
            FilterTag::Warmth => "Warmth",
            FilterTag::Sepia => "Sepia",
        }
    }

    /// Fresh identity-valued parameters for this variant
    pub fn default_kind(&self) -> FilterKind {
        match self {
            FilterTag::Saturation => FilterKind::Saturation(Saturation::default()),
            FilterTag::Brightness => FilterKind::Brightness(Brightness::default()),
            FilterTag::Contrast => FilterKind::Contrast(Contrast::default()),
            FilterTag::Warmth => FilterKind::Warmth(Warmth::default()),
            FilterTag::Sepia => FilterKind::Sepia(Sepia::default()),
        }
    }
}

impl fmt::Display for FilterTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown filter '{}'", s))
    }
}

/// Variant parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    Saturation(Saturation),
    Brightness(Brightness),
    Contrast(Contrast),
    Warmth(Warmth),
    Sepia(Sepia),
}

impl FilterKind {
    pub fn tag(&self) -> FilterTag {
        match self {
            FilterKind::Saturation(_) => FilterTag::Saturation,
            FilterKind::Brightness(_) => FilterTag::Brightness,
            FilterKind::Contrast(_) => FilterTag::Contrast,
            FilterKind::Warmth(_) => FilterTag::Warmth,
            FilterKind::Sepia(_) => FilterTag::Sepia,
        }
    }

    /// Parameter struct as JSON, the blob stored for this filter
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        match self {
            FilterKind::Saturation(p) => serde_json::to_string(p),
            FilterKind::Brightness(p) => serde_json::to_string(p),
            FilterKind::Contrast(p) => serde_json::to_string(p),
            FilterKind::Warmth(p) => serde_json::to_string(p),
            FilterKind::Sepia(p) => serde_json::to_string(p),
        }
    }

    fn adjustment(&self) -> &dyn ColorAdjustment {
        match self {
            FilterKind::Saturation(f) => f,
            FilterKind::Brightness(f) => f,
            FilterKind::Contrast(f) => f,
            FilterKind::Warmth(f) => f,
            FilterKind::Sepia(f) => f,
        }
    }

    fn adjustment_mut(&mut self) -> &mut dyn ColorAdjustment {
        match self {
            FilterKind::Saturation(f) => f,
            FilterKind::Brightness(f) => f,
            FilterKind::Contrast(f) => f,
            FilterKind::Warmth(f) => f,
            FilterKind::Sepia(f) => f,
        }
    }
}

/// A named filter instance
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    name: String,
    kind: FilterKind,
}

impl Filter {
    /// Create a filter named after its variant
    pub fn new(kind: FilterKind) -> Self {
        Self {
            name: kind.tag().display_name().to_string(),
            kind,
        }
    }

    pub fn with_name(name: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn saturation(saturation: f32) -> Self {
        Self::new(FilterKind::Saturation(Saturation {
            saturation: Saturation::SPEC.clamp(saturation),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    pub fn tag(&self) -> FilterTag {
        self.kind.tag()
    }
}

impl ColorAdjustment for Filter {
    fn apply_to(&self, transform: &ColorMatrix) -> ColorMatrix {
        self.kind.adjustment().apply_to(transform)
    }

    fn reset(&mut self) -> bool {
        self.kind.adjustment_mut().reset()
    }

    fn describe_controls(&self) -> Vec<ControlDescriptor> {
        self.kind.adjustment().describe_controls()
    }

    fn set_control(&mut self, key: &str, value: f32) -> Result<bool, PreconditionViolation> {
        self.kind.adjustment_mut().set_control(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip_through_from_str() {
        for tag in FilterTag::ALL {
            assert_eq!(tag.as_str().parse::<FilterTag>().unwrap(), tag);
        }
        assert!("vignette".parse::<FilterTag>().is_err());
    }

    #[test]
    fn test_new_filter_uses_display_name() {
        let filter = Filter::new(FilterTag::Sepia.default_kind());
        assert_eq!(filter.name(), "Sepia");
        assert_eq!(filter.tag(), FilterTag::Sepia);
    }

    #[test]
    fn test_slider_mapping_matches_centered_seek_bar() {
        let controls = Filter::saturation(1.0).describe_controls();
        let control = &controls[0];
        assert_eq!(control.slider_position(), 50);
        assert_eq!(control.value_at(0), 0.0);
        assert_eq!(control.value_at(50), 1.0);
        assert_eq!(control.value_at(100), 4.0);
        assert!((control.value_at(75) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_slider_mapping_for_endpoint_neutral() {
        let controls = Filter::new(FilterTag::Sepia.default_kind()).describe_controls();
        let control = &controls[0];
        assert_eq!(control.slider_position(), 0);
        assert!((control.value_at(50) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_filter_dispatches_to_variant() {
        let mut filter = Filter::saturation(1.0);
        assert!(filter.set_control("saturation", 0.0).unwrap());
        let expected = ColorMatrix::saturation(0.0);
        assert!(filter.apply_to(&ColorMatrix::identity()).approx_eq(&expected, 1e-6));
        assert!(filter.reset());
        assert!(filter.apply_to(&ColorMatrix::identity()).is_identity(1e-6));
    }
}
