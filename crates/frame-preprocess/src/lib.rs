// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # frame-preprocess
//!
//! Scale/crop preprocessing for the classification pipeline. A source
//! frame of any aspect ratio becomes a square RGB byte image of the
//! model's input size, produced asynchronously: the caller submits a
//! frame with [`ScaleCrop::request_scale_crop`] and later collects the
//! result with [`ScaleCrop::poll`].
//!
//! One request may be in flight at a time. A request made while the slot
//! is busy is dropped (the submit returns `Ok(false)`), which is how the
//! pipeline sheds load when frames arrive faster than the GPU drains
//! them.

mod error;
mod gpu;
mod software;
mod transform;

pub use error::PreprocessError;
pub use gpu::GpuPreprocessor;
pub use software::SoftwarePreprocessor;
pub use transform::ScaleTransform;

/// A borrowed RGBA8 source frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Tightly packed RGBA bytes, row-major, top row first.
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
}

impl Frame<'_> {
    /// Checks dimensions against the pixel buffer length.
    pub fn validate(&self) -> Result<(), PreprocessError> {
        if self.width == 0 || self.height == 0 {
            return Err(PreprocessError::InvalidFrame(format!(
                "zero dimension ({}x{})",
                self.width, self.height
            )));
        }
        let expected = self.width as usize * self.height as usize * 4;
        if self.pixels.len() != expected {
            return Err(PreprocessError::InvalidFrame(format!(
                "pixel buffer holds {} bytes, {}x{} RGBA needs {expected}",
                self.pixels.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }
}

/// Outcome of a completed scale/crop request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadbackResult {
    /// Tightly packed RGB bytes of the square target image.
    Complete(Vec<u8>),
    /// The readback failed (device loss, mapping error). The slot is
    /// free again; the frame is simply lost.
    Failed,
}

/// An asynchronous scale/crop stage with a single in-flight slot.
pub trait ScaleCrop {
    /// Submits `frame` for scaling into a `target_size` square.
    ///
    /// Returns `Ok(false)` when a previous request is still in flight —
    /// the frame is dropped, not queued.
    ///
    /// # Errors
    /// Returns [`PreprocessError::InvalidFrame`] for malformed frames
    /// and [`PreprocessError::ZeroTargetSize`] for a zero target.
    fn request_scale_crop(
        &mut self,
        frame: &Frame<'_>,
        target_size: u32,
    ) -> Result<bool, PreprocessError>;

    /// Polls the in-flight request.
    ///
    /// Returns `None` while the request is still pending (or no request
    /// exists); returns `Some` exactly once per completed request.
    fn poll(&mut self) -> Option<ReadbackResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_validate_ok() {
        let pixels = vec![0u8; 2 * 3 * 4];
        let frame = Frame {
            pixels: &pixels,
            width: 2,
            height: 3,
        };
        frame.validate().unwrap();
    }

    #[test]
    fn test_frame_validate_zero_dimension() {
        let frame = Frame {
            pixels: &[],
            width: 0,
            height: 4,
        };
        assert!(frame.validate().is_err());
    }

    #[test]
    fn test_frame_validate_length_mismatch() {
        let pixels = vec![0u8; 10];
        let frame = Frame {
            pixels: &pixels,
            width: 2,
            height: 2,
        };
        assert!(frame.validate().is_err());
    }
}
