// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Frame input and result output seams.
//!
//! The controller pulls frames from a [`FrameSource`] and pushes
//! classifications into a [`ResultSink`]; both are traits so tests and
//! embedders can script them.

use crate::InferenceResult;
use frame_preprocess::Frame;

/// An owned RGBA frame, as produced by a capture device.
#[derive(Debug, Clone)]
pub struct OwnedFrame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl OwnedFrame {
    /// Creates a solid-color frame, mostly useful for demos and tests.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            pixels: rgba.repeat((width * height) as usize),
            width,
            height,
        }
    }

    /// Borrows the frame for submission to a preprocessor.
    pub fn as_frame(&self) -> Frame<'_> {
        Frame {
            pixels: &self.pixels,
            width: self.width,
            height: self.height,
        }
    }
}

/// Supplies the newest available frame, if any.
///
/// Returning `None` means no frame is ready this tick; the controller
/// simply tries again next tick.
pub trait FrameSource {
    fn poll_frame(&mut self) -> Option<OwnedFrame>;
}

/// Receives completed classifications.
pub trait ResultSink {
    fn publish(&mut self, result: InferenceResult);
}

/// A [`ResultSink`] that keeps only the most recent classification.
#[derive(Debug, Default)]
pub struct LatestResult {
    slot: Option<InferenceResult>,
    total: u64,
}

impl LatestResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent classification, if any arrived yet.
    pub fn latest(&self) -> Option<&InferenceResult> {
        self.slot.as_ref()
    }

    /// How many results have been published in total.
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl ResultSink for LatestResult {
    fn publish(&mut self, result: InferenceResult) {
        self.total += 1;
        self.slot = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(label: &str) -> InferenceResult {
        InferenceResult {
            class_index: 0,
            confidence: 1.0,
            label: label.into(),
        }
    }

    #[test]
    fn test_latest_keeps_newest() {
        let mut sink = LatestResult::new();
        assert!(sink.latest().is_none());

        sink.publish(result("cat"));
        sink.publish(result("dog"));
        assert_eq!(sink.latest().map(|r| r.label.as_str()), Some("dog"));
        assert_eq!(sink.total(), 2);
    }

    #[test]
    fn test_solid_frame_layout() {
        let frame = OwnedFrame::solid(2, 2, [1, 2, 3, 4]);
        assert_eq!(frame.pixels.len(), 16);
        assert_eq!(&frame.pixels[..4], &[1, 2, 3, 4]);
        frame.as_frame().validate().unwrap();
    }
}
