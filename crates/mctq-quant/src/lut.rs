//! Look-Up-Table Quantization
//!
//! Cluster-center tables and the per-channel dequantized value sets used by
//! the look-up-table schemes.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::quantize::ChannelKernel;
use crate::validate::{multiplier_range, pow2};

// =============================================================================
// Cluster Table
// =============================================================================

/// Integer cluster centers and the fixed-point geometry they live in.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterTable {
    centers: Vec<f32>,
    signed: bool,
    num_bits: u32,
    multiplier_n_bits: u32,
    eps: f32,
}

impl ClusterTable {
    /// Creates a table from already validated centers.
    pub fn new(
        centers: Vec<f32>,
        signed: bool,
        num_bits: u32,
        multiplier_n_bits: u32,
        eps: f32,
    ) -> Self {
        Self {
            centers,
            signed,
            num_bits,
            multiplier_n_bits,
            eps,
        }
    }

    /// Factor applied to a normalized input: `2^(num_bits - 1)` if signed,
    /// `2^multiplier_n_bits` otherwise.
    ///
    /// Unsigned inputs are spread over the whole multiplier range, so `num_bits`
    /// only bounds how many centers the table may hold.
    pub fn step(&self) -> f32 {
        if self.signed {
            pow2(self.num_bits - 1)
        } else {
            pow2(self.multiplier_n_bits)
        }
    }

    /// Inclusive clipping range of scaled inputs.
    pub fn bounds(&self) -> (f32, f32) {
        multiplier_range(self.signed, self.multiplier_n_bits)
    }

    /// Divisor that maps a center back to the unit range.
    pub fn divisor(&self) -> f32 {
        pow2(self.multiplier_n_bits - u32::from(self.signed))
    }

    /// Normalizes, scales and clips `x` against `threshold`.
    #[inline]
    pub fn scale_input(&self, x: f32, threshold: f32) -> f32 {
        let (lo, hi) = self.bounds();
        (x / (threshold + self.eps) * self.step()).clamp(lo, hi)
    }

    /// Index of the center closest to `scaled`.
    ///
    /// Ties go to the lowest index. A NaN input selects index 0.
    pub fn nearest_index(&self, scaled: f32) -> usize {
        let mut best = 0;
        let mut best_distance = f32::INFINITY;
        for (i, &center) in self.centers.iter().enumerate() {
            let distance = (scaled - center).abs();
            if distance < best_distance {
                best = i;
                best_distance = distance;
            }
        }
        best
    }

    /// Output value of every center for the given threshold, in center order.
    pub fn dequantized_values(&self, threshold: f32) -> Vec<f32> {
        let divisor = self.divisor();
        self.centers
            .iter()
            .map(|&c| c / divisor * threshold)
            .collect()
    }
}

// =============================================================================
// LUT Model
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct LutChannel {
    threshold: f32,
    values: Vec<f32>,
}

/// A cluster table paired with one threshold per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct LutModel {
    table: ClusterTable,
    channels: Vec<LutChannel>,
}

impl LutModel {
    /// Builds the model; each channel's output set is computed once here.
    pub fn new(table: ClusterTable, thresholds: &[f32]) -> Self {
        let channels = thresholds
            .iter()
            .map(|&threshold| LutChannel {
                threshold,
                values: table.dequantized_values(threshold),
            })
            .collect();
        Self { table, channels }
    }
}

impl ChannelKernel for LutModel {
    fn num_channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    fn apply(&self, channel: usize, x: f32) -> f32 {
        let channel = &self.channels[channel];
        let scaled = self.table.scale_input(x, channel.threshold);
        channel.values[self.table.nearest_index(scaled)]
    }

    fn output_range(&self, channel: usize) -> (f32, f32) {
        self.channels[channel]
            .values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

// =============================================================================
// Tests
// =============================================================================
