//! Quantization Kernel
//!
//! Applies a per-channel model to every element of a tensor, plus error
//! statistics for comparing a tensor with its quantized form. The kernel is
//! internal to the crate; statistics and channel indexing are public.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use std::collections::HashSet;

use mctq_tensor::{axis_aligned_shape, Tensor};
use rayon::prelude::*;

use crate::error::{QuantError, QuantResult};

// =============================================================================
// Channel Kernel
// =============================================================================

/// Element transform parameterized by channel.
///
/// Implemented by the threshold and look-up-table models; the kernel below
/// only handles layout and broadcasting.
pub(crate) trait ChannelKernel: Send + Sync {
    /// Number of parameter channels.
    fn num_channels(&self) -> usize;

    /// Quantizes one value with the parameters of `channel`.
    fn apply(&self, channel: usize, x: f32) -> f32;

    /// Smallest and largest value `apply` can return for `channel`.
    fn output_range(&self, channel: usize) -> (f32, f32);
}

// =============================================================================
// Public API
// =============================================================================

/// Quantizes a tensor element by element.
///
/// With `channel_axis == None` every element uses channel 0. Otherwise the
/// tensor's `channel_axis` dimension must equal `kernel.num_channels()` and
/// each element uses the parameters of its index along that axis. A kernel
/// without channels is rejected.
///
/// # Returns
/// A tensor of the same shape holding the quantized values.
pub(crate) fn quantize_tensor<K: ChannelKernel + ?Sized>(
    tensor: &Tensor<f32>,
    kernel: &K,
    channel_axis: Option<usize>,
) -> QuantResult<Tensor<f32>> {
    if kernel.num_channels() == 0 {
        return Err(QuantError::ChannelMismatch {
            axis: channel_axis.unwrap_or(0),
            expected: 0,
            actual: channel_axis
                .and_then(|axis| tensor.shape().get(axis).copied())
                .unwrap_or(1),
        });
    }

    let data: Vec<f32> = match channel_axis {
        None => tensor
            .as_slice()
            .par_iter()
            .map(|&x| kernel.apply(0, x))
            .collect(),
        Some(axis) => {
            let channels = broadcast_channel_index(tensor.shape(), axis, kernel.num_channels())?;
            tensor
                .as_slice()
                .par_iter()
                .zip(channels.as_slice().par_iter())
                .map(|(&x, &c)| kernel.apply(c, x))
                .collect()
        }
    };

    Ok(Tensor::from_vec(data, tensor.shape())?)
}

/// Channel index of every element of a tensor with `shape`.
///
/// The vector `0..channels` is laid along `axis` and broadcast over the
/// remaining dimensions.
pub fn broadcast_channel_index(
    shape: &[usize],
    axis: usize,
    channels: usize,
) -> QuantResult<Tensor<usize>> {
    if axis >= shape.len() {
        return Err(QuantError::RankMismatch {
            expected: axis + 1,
            actual: shape.len(),
        });
    }
    if shape[axis] != channels {
        return Err(QuantError::ChannelMismatch {
            axis,
            expected: channels,
            actual: shape[axis],
        });
    }

    let aligned = axis_aligned_shape(channels, axis, shape.len())?;
    let index = Tensor::from_vec((0..channels).collect(), &aligned)?;
    Ok(index.broadcast_to(shape)?)
}

// =============================================================================
// Statistics
// =============================================================================

/// Error statistics of a quantized tensor against its source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizationStats {
    /// Root mean square error.
    pub rmse: f32,
    /// Maximum absolute error.
    pub max_error: f32,
    /// Mean absolute error.
    pub mean_error: f32,
    /// Number of distinct quantized values.
    pub distinct_values: usize,
}

/// Compares `original` with `quantized` element by element.
///
/// Empty inputs give all-zero statistics.
pub fn compute_quantization_stats(original: &[f32], quantized: &[f32]) -> QuantizationStats {
    let errors: Vec<f32> = original
        .iter()
        .zip(quantized.iter())
        .map(|(a, b)| (a - b).abs())
        .collect();

    if errors.is_empty() {
        return QuantizationStats {
            rmse: 0.0,
            max_error: 0.0,
            mean_error: 0.0,
            distinct_values: distinct_values(quantized),
        };
    }

    let n = errors.len() as f32;
    let mse: f32 = errors.iter().map(|e| e.powi(2)).sum::<f32>() / n;
    let max_error = errors.iter().fold(0.0f32, |a, &b| a.max(b));
    let mean_error = errors.iter().sum::<f32>() / n;

    QuantizationStats {
        rmse: mse.sqrt(),
        max_error,
        mean_error,
        distinct_values: distinct_values(quantized),
    }
}

/// Number of distinct values in `data`; `-0.0` and `0.0` count once.
pub fn distinct_values(data: &[f32]) -> usize {
    data.iter()
        .map(|&x| if x == 0.0 { 0.0f32 } else { x }.to_bits())
        .collect::<HashSet<u32>>()
        .len()
}

/// Number of distinct values in each slice of `tensor` along `axis`.
pub fn distinct_per_channel(tensor: &Tensor<f32>, axis: usize) -> QuantResult<Vec<usize>> {
    let channels = tensor.shape().get(axis).copied().ok_or(QuantError::RankMismatch {
        expected: axis + 1,
        actual: tensor.ndim(),
    })?;
    let index = broadcast_channel_index(tensor.shape(), axis, channels)?;

    let mut slices = vec![Vec::new(); channels];
    for (&x, &c) in tensor.as_slice().iter().zip(index.as_slice()) {
        slices[c].push(x);
    }
    Ok(slices.iter().map(|s| distinct_values(s)).collect())
}

// =============================================================================
// Tests
// =============================================================================
