//! Tensor Creation Functions
//!
//! Factory functions for building input tensors: constant fills, evenly spaced
//! ranges, and seeded uniform noise for reproducible experiments.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Error, Result};
use crate::shape::{contiguous_strides, numel, Shape};
use crate::tensor::{Scalar, Tensor};

// =============================================================================
// Constant Initialization
// =============================================================================

/// Creates a tensor filled with a specific value.
pub fn full<T: Scalar>(shape: &[usize], value: T) -> Tensor<T> {
    let shape = Shape::from_slice(shape);
    Tensor {
        data: vec![value; numel(&shape)],
        strides: contiguous_strides(&shape),
        shape,
    }
}

/// Creates a tensor filled with `T::default()` (zero for numbers).
#[must_use]
pub fn zeros<T: Scalar>(shape: &[usize]) -> Tensor<T> {
    full(shape, T::default())
}

// =============================================================================
// Range Functions
// =============================================================================

/// Creates a 1D tensor of `steps` evenly spaced values from `start` to `end`
/// inclusive.
pub fn linspace(start: f32, end: f32, steps: usize) -> Result<Tensor<f32>> {
    if steps == 0 {
        return Err(Error::invalid_operation("linspace requires at least one step"));
    }
    if steps == 1 {
        return Tensor::from_vec(vec![start], &[1]);
    }

    let step = (end - start) / (steps - 1) as f32;
    let data = (0..steps).map(|i| start + i as f32 * step).collect();
    Tensor::from_vec(data, &[steps])
}

// =============================================================================
// Random Initialization
// =============================================================================

/// Creates a tensor with uniformly distributed values in `[low, high)`.
///
/// The same `seed` always produces the same tensor.
pub fn uniform_seeded(shape: &[usize], low: f32, high: f32, seed: u64) -> Result<Tensor<f32>> {
    if !(low < high) {
        return Err(Error::invalid_operation(format!(
            "uniform requires low < high, got [{low}, {high})"
        )));
    }

    let numel: usize = shape.iter().product();
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(low, high);
    let data: Vec<f32> = (0..numel).map(|_| dist.sample(&mut rng)).collect();
    Tensor::from_vec(data, shape)
}

// =============================================================================
// Tests
// =============================================================================
