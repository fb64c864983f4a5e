// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Centered-crop UV transform.
//!
//! Mapping a non-square frame onto a square target keeps the shorter
//! dimension whole and crops the longer one symmetrically. In UV space
//! that is `src_uv = dst_uv * scale + offset` with the scale shrinking
//! the long axis and the offset centering the window.

/// UV-space scale and offset for a centered square crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleTransform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ScaleTransform {
    /// Computes the transform for a `width` x `height` source frame.
    ///
    /// A landscape frame crops its sides, a portrait frame its top and
    /// bottom; a square frame passes through unchanged.
    pub fn for_frame(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        if width > height {
            let sx = h / w;
            Self {
                scale_x: sx,
                scale_y: 1.0,
                offset_x: (1.0 - sx) / 2.0,
                offset_y: 0.0,
            }
        } else if height > width {
            let sy = w / h;
            Self {
                scale_x: 1.0,
                scale_y: sy,
                offset_x: 0.0,
                offset_y: (1.0 - sy) / 2.0,
            }
        } else {
            Self {
                scale_x: 1.0,
                scale_y: 1.0,
                offset_x: 0.0,
                offset_y: 0.0,
            }
        }
    }

    /// Maps a target-space UV coordinate into source space.
    pub fn apply(&self, u: f32, v: f32) -> (f32, f32) {
        (
            u * self.scale_x + self.offset_x,
            v * self.scale_y + self.offset_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_is_identity() {
        let t = ScaleTransform::for_frame(256, 256);
        assert_eq!(t.apply(0.0, 0.0), (0.0, 0.0));
        assert_eq!(t.apply(1.0, 1.0), (1.0, 1.0));
    }

    #[test]
    fn test_landscape_crops_sides() {
        // 640x480: scale_x = 0.75, offset_x = 0.125.
        let t = ScaleTransform::for_frame(640, 480);
        assert!((t.scale_x - 0.75).abs() < 1e-6);
        assert!((t.offset_x - 0.125).abs() < 1e-6);
        assert_eq!(t.scale_y, 1.0);
        assert_eq!(t.offset_y, 0.0);

        // The crop window is centered: UV 0.5 maps to source 0.5.
        let (u, _) = t.apply(0.5, 0.5);
        assert!((u - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_portrait_crops_vertically() {
        let t = ScaleTransform::for_frame(480, 640);
        assert_eq!(t.scale_x, 1.0);
        assert!((t.scale_y - 0.75).abs() < 1e-6);
        assert!((t.offset_y - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_window_stays_inside_source() {
        for (w, h) in [(1920, 1080), (1080, 1920), (100, 99)] {
            let t = ScaleTransform::for_frame(w, h);
            let (u0, v0) = t.apply(0.0, 0.0);
            let (u1, v1) = t.apply(1.0, 1.0);
            assert!(u0 >= 0.0 && v0 >= 0.0);
            assert!(u1 <= 1.0 + 1e-6 && v1 <= 1.0 + 1e-6);
        }
    }
}
