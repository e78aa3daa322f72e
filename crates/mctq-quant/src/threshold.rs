//! Threshold Model
//!
//! Turns validated thresholds or ranges into the per-channel integer grid the
//! kernel rounds onto.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::quantize::ChannelKernel;
use crate::validate::pow2;

// =============================================================================
// Channel Grid
// =============================================================================

/// Uniform integer grid for one channel.
///
/// A value `x` maps to `clamp(round((x - anchor) / scale), q_min, q_max) *
/// scale + anchor`, except that index `q_max` maps to `upper` exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelGrid {
    /// Distance between neighbouring grid points.
    pub scale: f32,
    /// Value represented by grid index 0.
    pub anchor: f32,
    /// Lowest grid index.
    pub q_min: f32,
    /// Highest grid index.
    pub q_max: f32,
    /// Value represented by `q_max`.
    upper: f32,
}

impl ChannelGrid {
    /// Grid for a symmetric threshold.
    ///
    /// Signed grids cover `[-threshold, threshold - scale]` with
    /// `scale = threshold / 2^(num_bits - 1)`; unsigned grids cover
    /// `[0, threshold - scale]` with `scale = threshold / 2^num_bits`.
    pub fn symmetric(threshold: f32, num_bits: u32, signed: bool) -> Self {
        let levels = if signed {
            pow2(num_bits - 1)
        } else {
            pow2(num_bits)
        };
        let scale = threshold / levels;
        Self {
            scale,
            anchor: 0.0,
            q_min: if signed { -levels } else { 0.0 },
            q_max: levels - 1.0,
            upper: (levels - 1.0) * scale,
        }
    }

    /// Grid spanning `[min_range, max_range]` with `2^num_bits` points.
    ///
    /// The end points are reproduced exactly; `(2^n - 1) * scale + min_range`
    /// can land one ulp past `max_range` in `f32`.
    pub fn uniform(min_range: f32, max_range: f32, num_bits: u32) -> Self {
        let steps = pow2(num_bits) - 1.0;
        Self {
            scale: (max_range - min_range) / steps,
            anchor: min_range,
            q_min: 0.0,
            q_max: steps,
            upper: max_range,
        }
    }

    /// Smallest representable output.
    pub fn clip_min(&self) -> f32 {
        self.q_min * self.scale + self.anchor
    }

    /// Largest representable output.
    pub fn clip_max(&self) -> f32 {
        self.upper
    }

    /// Rounds `x` onto the grid (half away from zero) and clips it.
    #[inline]
    pub fn fake_quantize(&self, x: f32) -> f32 {
        let q = ((x - self.anchor) / self.scale)
            .round()
            .clamp(self.q_min, self.q_max);
        if q >= self.q_max {
            self.upper
        } else {
            (q * self.scale + self.anchor).min(self.upper)
        }
    }
}

// =============================================================================
// Threshold Model
// =============================================================================

/// Per-channel grids derived from thresholds or uniform ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdModel {
    channels: Vec<ChannelGrid>,
}

impl ThresholdModel {
    /// Builds the model for the symmetric and power-of-two schemes.
    pub fn symmetric(thresholds: &[f32], num_bits: u32, signed: bool) -> Self {
        Self {
            channels: thresholds
                .iter()
                .map(|&t| ChannelGrid::symmetric(t, num_bits, signed))
                .collect(),
        }
    }

    /// Builds the model for the uniform scheme.
    pub fn uniform(min_range: &[f32], max_range: &[f32], num_bits: u32) -> Self {
        Self {
            channels: min_range
                .iter()
                .zip(max_range.iter())
                .map(|(&min, &max)| ChannelGrid::uniform(min, max, num_bits))
                .collect(),
        }
    }
}

impl ChannelKernel for ThresholdModel {
    fn num_channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    fn apply(&self, channel: usize, x: f32) -> f32 {
        self.channels[channel].fake_quantize(x)
    }

    fn output_range(&self, channel: usize) -> (f32, f32) {
        let grid = &self.channels[channel];
        (grid.clip_min(), grid.clip_max())
    }
}

// =============================================================================
// Tests
// =============================================================================
