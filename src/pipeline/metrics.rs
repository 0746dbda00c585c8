// src/pipeline/metrics.rs
//
// Per-run counters for the capture loop, reported once at the end.

use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub total_frames: u64,
    pub frames_with_pose: u64,
    pub oracle_failures: u64,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: 0,
            frames_with_pose: 0,
            oracle_failures: 0,
            started_at: Instant::now(),
        }
    }

    pub fn record_frame(&mut self, had_pose: bool) {
        self.total_frames += 1;
        if had_pose {
            self.frames_with_pose += 1;
        }
    }

    pub fn record_oracle_failure(&mut self) {
        self.oracle_failures += 1;
    }

    pub fn fps(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            self.total_frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            frames_with_pose: self.frames_with_pose,
            oracle_failures: self.oracle_failures,
            fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub frames_with_pose: u64,
    pub oracle_failures: u64,
    pub fps: f64,
    pub elapsed_secs: f64,
}

impl MetricsSummary {
    pub fn pose_coverage(&self) -> f64 {
        100.0 * self.frames_with_pose as f64 / self.total_frames.max(1) as f64
    }
}
