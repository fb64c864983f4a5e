// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-pipeline counters.

/// Counters accumulated across the pipeline's lifetime.
#[derive(Debug, Default, Clone)]
pub struct PipelineMetrics {
    /// Ticks the controller has run.
    pub ticks: u64,
    /// Frames pulled from the source.
    pub frames_seen: u64,
    /// Frames submitted for preprocessing.
    pub frames_submitted: u64,
    /// Frames shed: busy slot, undersized, or no engine.
    pub frames_dropped: u64,
    /// Readbacks that came back failed.
    pub readback_failures: u64,
    /// Frames that reached inference but failed there.
    pub inference_failures: u64,
    /// Completed inference cycles.
    pub inferences: u64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-line summary for shutdown logging.
    pub fn summary(&self) -> String {
        format!(
            "ticks={} frames_seen={} submitted={} dropped={} readback_failures={} \
             inference_failures={} inferences={}",
            self.ticks,
            self.frames_seen,
            self.frames_submitted,
            self.frames_dropped,
            self.readback_failures,
            self.inference_failures,
            self.inferences,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_contains_counts() {
        let metrics = PipelineMetrics {
            ticks: 10,
            frames_seen: 5,
            frames_submitted: 4,
            frames_dropped: 1,
            readback_failures: 0,
            inference_failures: 1,
            inferences: 3,
        };
        let s = metrics.summary();
        assert!(s.contains("ticks=10"));
        assert!(s.contains("inference_failures=1"));
        assert!(s.contains("inferences=3"));
    }
}
