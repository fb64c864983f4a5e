// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CPU fallback for machines without a GPU adapter.
//!
//! Samples the source with the same centered-crop transform as the GPU
//! path, using bilinear interpolation. Completion is deferred by a
//! configurable number of polls so the pipeline sees the same
//! request/poll rhythm as with real readback latency.

use crate::transform::ScaleTransform;
use crate::{Frame, PreprocessError, ReadbackResult, ScaleCrop};

/// The CPU-backed [`ScaleCrop`] implementation.
pub struct SoftwarePreprocessor {
    delay_polls: u32,
    pending: Option<Pending>,
}

struct Pending {
    rgb: Vec<u8>,
    polls_left: u32,
}

impl SoftwarePreprocessor {
    /// `delay_polls` is how many `poll` calls a request stays pending
    /// before completing; `1` completes on the next poll.
    pub fn new(delay_polls: u32) -> Self {
        Self {
            delay_polls,
            pending: None,
        }
    }

    fn scale_crop(frame: &Frame<'_>, target_size: u32) -> Vec<u8> {
        let t = ScaleTransform::for_frame(frame.width, frame.height);
        let step = 1.0 / target_size as f32;
        let mut rgb = Vec::with_capacity((target_size * target_size * 3) as usize);

        for y in 0..target_size {
            let v = (y as f32 + 0.5) * step;
            for x in 0..target_size {
                let u = (x as f32 + 0.5) * step;
                let (su, sv) = t.apply(u, v);
                let px = sample_bilinear(frame, su, sv);
                rgb.extend_from_slice(&px);
            }
        }
        rgb
    }
}

impl Default for SoftwarePreprocessor {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ScaleCrop for SoftwarePreprocessor {
    fn request_scale_crop(
        &mut self,
        frame: &Frame<'_>,
        target_size: u32,
    ) -> Result<bool, PreprocessError> {
        frame.validate()?;
        if target_size == 0 {
            return Err(PreprocessError::ZeroTargetSize);
        }
        if self.pending.is_some() {
            tracing::trace!("scale/crop slot busy, dropping frame");
            return Ok(false);
        }

        self.pending = Some(Pending {
            rgb: Self::scale_crop(frame, target_size),
            polls_left: self.delay_polls,
        });
        Ok(true)
    }

    fn poll(&mut self) -> Option<ReadbackResult> {
        let pending = self.pending.as_mut()?;
        if pending.polls_left > 1 {
            pending.polls_left -= 1;
            return None;
        }
        let pending = self.pending.take()?;
        Some(ReadbackResult::Complete(pending.rgb))
    }
}

/// Bilinear RGB sample at a UV coordinate (clamped to the frame edge).
fn sample_bilinear(frame: &Frame<'_>, u: f32, v: f32) -> [u8; 3] {
    let fx = (u * frame.width as f32 - 0.5).max(0.0);
    let fy = (v * frame.height as f32 - 0.5).max(0.0);
    let x0 = (fx as u32).min(frame.width - 1);
    let y0 = (fy as u32).min(frame.height - 1);
    let x1 = (x0 + 1).min(frame.width - 1);
    let y1 = (y0 + 1).min(frame.height - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let at = |x: u32, y: u32, c: usize| -> f32 {
        frame.pixels[(y * frame.width + x) as usize * 4 + c] as f32
    };

    let mut out = [0u8; 3];
    for (c, dst) in out.iter_mut().enumerate() {
        let top = at(x0, y0, c) * (1.0 - tx) + at(x1, y0, c) * tx;
        let bottom = at(x0, y1, c) * (1.0 - tx) + at(x1, y1, c) * tx;
        *dst = (top * (1.0 - ty) + bottom * ty).round() as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.repeat((width * height) as usize)
    }

    #[test]
    fn test_request_then_poll_completes() {
        let pixels = solid_frame(8, 8, [10, 20, 30, 255]);
        let frame = Frame {
            pixels: &pixels,
            width: 8,
            height: 8,
        };
        let mut pre = SoftwarePreprocessor::new(1);

        assert!(pre.request_scale_crop(&frame, 4).unwrap());
        match pre.poll() {
            Some(ReadbackResult::Complete(rgb)) => {
                assert_eq!(rgb.len(), 4 * 4 * 3);
                assert_eq!(&rgb[..3], &[10, 20, 30]);
            }
            other => panic!("unexpected poll result: {other:?}"),
        }
        // The slot is free again and yields nothing more.
        assert!(pre.poll().is_none());
    }

    #[test]
    fn test_busy_slot_drops_frame() {
        let pixels = solid_frame(4, 4, [1, 2, 3, 255]);
        let frame = Frame {
            pixels: &pixels,
            width: 4,
            height: 4,
        };
        let mut pre = SoftwarePreprocessor::new(2);

        assert!(pre.request_scale_crop(&frame, 2).unwrap());
        // Still pending: the second request is shed, not queued.
        assert!(!pre.request_scale_crop(&frame, 2).unwrap());
        assert!(pre.poll().is_none());
        assert!(matches!(pre.poll(), Some(ReadbackResult::Complete(_))));
    }

    #[test]
    fn test_delay_counts_polls() {
        let pixels = solid_frame(2, 2, [0, 0, 0, 255]);
        let frame = Frame {
            pixels: &pixels,
            width: 2,
            height: 2,
        };
        let mut pre = SoftwarePreprocessor::new(3);

        pre.request_scale_crop(&frame, 2).unwrap();
        assert!(pre.poll().is_none());
        assert!(pre.poll().is_none());
        assert!(pre.poll().is_some());
    }

    #[test]
    fn test_landscape_crop_takes_center() {
        // 8x4 frame: left half black, right half white. The centered
        // 4x4 crop straddles the boundary, so the output has both.
        let mut pixels = Vec::new();
        for _y in 0..4 {
            for x in 0..8 {
                let v = if x < 4 { 0u8 } else { 255 };
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let frame = Frame {
            pixels: &pixels,
            width: 8,
            height: 4,
        };
        let mut pre = SoftwarePreprocessor::new(1);
        pre.request_scale_crop(&frame, 4).unwrap();
        let Some(ReadbackResult::Complete(rgb)) = pre.poll() else {
            panic!("expected completion");
        };

        // First column comes from the dark side, last from the bright.
        assert!(rgb[0] < 128);
        assert!(rgb[(3 * 3) as usize] > 128);
    }

    #[test]
    fn test_zero_target_rejected() {
        let pixels = solid_frame(2, 2, [0, 0, 0, 255]);
        let frame = Frame {
            pixels: &pixels,
            width: 2,
            height: 2,
        };
        let mut pre = SoftwarePreprocessor::new(1);
        assert!(matches!(
            pre.request_scale_crop(&frame, 0),
            Err(PreprocessError::ZeroTargetSize)
        ));
    }
}
