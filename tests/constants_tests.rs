// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use photostudio::constants::{QualityPreset, SLIDER_CENTER, SLIDER_MAX};

#[test]
fn test_quality_preset_values() {
    assert_eq!(QualityPreset::ALL.len(), 4);
}

#[test]
fn test_quality_preset_ordering() {
    // Presets are ordered from lowest to highest quality
    let mut prev = 0u8;
    for preset in QualityPreset::ALL {
        let quality = preset.jpeg_quality();
        assert!(quality > prev, "Presets should be ordered from lowest to highest");
        assert!(quality <= 100);
        prev = quality;
    }
}

#[test]
fn test_quality_preset_display_names() {
    for preset in QualityPreset::ALL {
        let name = preset.display_name();
        assert!(!name.is_empty(), "Preset {:?} has empty display name", preset);
    }
}

#[test]
fn test_slider_center_is_midpoint() {
    assert_eq!(SLIDER_CENTER * 2, SLIDER_MAX);
}
