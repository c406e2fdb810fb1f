// SPDX-License-Identifier: GPL-3.0-only

//! 4x5 color matrix
//!
//! Rows produce R, G, B, A; the first four columns multiply the input channels
//! and the fifth is an additive offset. Channels are normalized to 0.0..=1.0,
//! so offsets are in the same unit.

use std::fmt;

/// Luminance weights shared by the saturation and grayscale matrices
pub const LUMA_R: f32 = 0.213;
pub const LUMA_G: f32 = 0.715;
pub const LUMA_B: f32 = 0.072;

/// A linear color transformation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix {
    m: [f32; 20],
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl ColorMatrix {
    pub const fn identity() -> Self {
        Self {
            m: [
                1.0, 0.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0, 0.0, //
            ],
        }
    }

    /// Build a matrix from a 3x3 RGB block, leaving alpha untouched
    pub fn from_rgb(rgb: [[f32; 3]; 3], offset: [f32; 3]) -> Self {
        let mut m = Self::identity().m;
        for (row, coeffs) in rgb.iter().enumerate() {
            m[row * 5..row * 5 + 3].copy_from_slice(coeffs);
            m[row * 5 + 4] = offset[row];
        }
        Self { m }
    }

    /// Saturation matrix: 1.0 is identity, 0.0 maps every color to its luminance
    pub fn saturation(sat: f32) -> Self {
        let inv = 1.0 - sat;
        let r = LUMA_R * inv;
        let g = LUMA_G * inv;
        let b = LUMA_B * inv;
        Self::from_rgb([[r + sat, g, b], [r, g + sat, b], [r, g, b + sat]], [0.0; 3])
    }

    /// Per-channel gains with a shared offset
    pub fn scale(gains: [f32; 3], offset: f32) -> Self {
        Self::from_rgb(
            [
                [gains[0], 0.0, 0.0],
                [0.0, gains[1], 0.0],
                [0.0, 0.0, gains[2]],
            ],
            [offset; 3],
        )
    }

    /// Linear blend between two matrices (`t = 0` is `self`)
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut m = [0.0; 20];
        for (i, v) in m.iter_mut().enumerate() {
            *v = self.m[i] + (other.m[i] - self.m[i]) * t;
        }
        Self { m }
    }

    /// `a · b`: the result applies `b` first, then `a`
    pub fn concat(a: &Self, b: &Self) -> Self {
        let mut m = [0.0; 20];
        for row in 0..4 {
            for col in 0..5 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a.m[row * 5 + k] * b.m[k * 5 + col];
                }
                if col == 4 {
                    sum += a.m[row * 5 + 4];
                }
                m[row * 5 + col] = sum;
            }
        }
        Self { m }
    }

    /// Returns `post · self`, i.e. `post` takes effect after this matrix
    pub fn post_concat(&self, post: &Self) -> Self {
        Self::concat(post, self)
    }

    /// Transform one normalized RGBA color
    pub fn apply(&self, rgba: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (row, v) in out.iter_mut().enumerate() {
            let r = &self.m[row * 5..row * 5 + 5];
            *v = r[0] * rgba[0] + r[1] * rgba[1] + r[2] * rgba[2] + r[3] * rgba[3] + r[4];
        }
        out
    }

    /// Transform an RGBA8 buffer in place
    pub fn apply_rgba8(&self, data: &mut [u8]) {
        if *self == Self::identity() {
            return;
        }
        for px in data.chunks_exact_mut(4) {
            let input = [
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
                px[3] as f32 / 255.0,
            ];
            let out = self.apply(input);
            for (dst, v) in px.iter_mut().zip(out) {
                *dst = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        }
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    pub fn is_identity(&self, epsilon: f32) -> bool {
        self.approx_eq(&Self::identity(), epsilon)
    }
}

impl fmt::Display for ColorMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            let r = &self.m[row * 5..row * 5 + 5];
            writeln!(
                f,
                "[{:>7.3} {:>7.3} {:>7.3} {:>7.3} | {:>7.3}]",
                r[0], r[1], r[2], r[3], r[4]
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_leaves_color_unchanged() {
        let color = [0.2, 0.4, 0.6, 1.0];
        assert_eq!(ColorMatrix::identity().apply(color), color);
    }

    #[test]
    fn test_full_desaturation_produces_gray() {
        let out = ColorMatrix::saturation(0.0).apply([1.0, 0.0, 0.0, 1.0]);
        assert!((out[0] - LUMA_R).abs() < 1e-6);
        assert!((out[1] - LUMA_R).abs() < 1e-6);
        assert!((out[2] - LUMA_R).abs() < 1e-6);
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn test_post_concat_applies_after() {
        // brighten, then scale: (0.5 + 0.1) * 2 = 1.2
        let brighten = ColorMatrix::scale([1.0; 3], 0.1);
        let double = ColorMatrix::scale([2.0; 3], 0.0);
        let combined = brighten.post_concat(&double);
        let out = combined.apply([0.5, 0.5, 0.5, 1.0]);
        assert!((out[0] - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_apply_rgba8_clamps() {
        let mut data = vec![200, 100, 50, 255];
        ColorMatrix::scale([2.0; 3], 0.0).apply_rgba8(&mut data);
        assert_eq!(data, vec![255, 200, 100, 255]);
    }
}
