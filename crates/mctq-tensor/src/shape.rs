//! Shape and Strides - Tensor Dimension Management
//!
//! Shape arithmetic for row-major tensors: element counts, strides, index
//! conversion, `NumPy`-style broadcasting, and the axis-aligned shape used to
//! line a per-channel parameter vector up with one axis of a tensor.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use smallvec::SmallVec;

use crate::error::{Error, Result};

// =============================================================================
// Type Aliases
// =============================================================================

/// Shape type - dimensions of a tensor.
/// Uses `SmallVec` for stack allocation of small shapes (up to 6 dimensions).
pub type Shape = SmallVec<[usize; 6]>;

/// Strides type - step sizes for each dimension.
pub type Strides = SmallVec<[isize; 6]>;

// =============================================================================
// Shape Utilities
// =============================================================================

/// Total number of elements of a shape (1 for a scalar shape).
#[must_use]
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Computes row-major (C-order) strides for a shape.
#[must_use]
pub fn contiguous_strides(shape: &[usize]) -> Strides {
    let mut strides = Strides::with_capacity(shape.len());
    let mut stride = 1isize;

    for &dim in shape.iter().rev() {
        strides.push(stride);
        stride *= dim as isize;
    }

    strides.reverse();
    strides
}

/// Computes the linear offset of multi-dimensional indices.
#[must_use]
pub fn linear_index(indices: &[usize], strides: &[isize]) -> usize {
    debug_assert_eq!(indices.len(), strides.len());

    indices
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx as isize * stride)
        .sum::<isize>() as usize
}

/// Converts a linear index to multi-dimensional indices.
#[must_use]
pub fn unravel_index(mut linear: usize, shape: &[usize]) -> Vec<usize> {
    let mut indices = vec![0; shape.len()];

    for (i, &dim) in shape.iter().enumerate().rev() {
        indices[i] = linear % dim;
        linear /= dim;
    }

    indices
}

// =============================================================================
// Broadcasting
// =============================================================================

/// Computes the broadcast shape of two shapes.
///
/// Shapes are aligned from the right; two dimensions are compatible if they
/// are equal or one of them is 1, and missing dimensions count as 1.
pub fn broadcast_shape(shape1: &[usize], shape2: &[usize]) -> Result<Shape> {
    let max_ndim = shape1.len().max(shape2.len());
    let mut result = Shape::with_capacity(max_ndim);

    for i in 0..max_ndim {
        let d1 = shape1.len().checked_sub(i + 1).map_or(1, |j| shape1[j]);
        let d2 = shape2.len().checked_sub(i + 1).map_or(1, |j| shape2[j]);

        if d1 == d2 || d2 == 1 {
            result.push(d1);
        } else if d1 == 1 {
            result.push(d2);
        } else {
            return Err(Error::BroadcastError {
                shape1: shape1.to_vec(),
                shape2: shape2.to_vec(),
            });
        }
    }

    result.reverse();
    Ok(result)
}

/// Computes strides that read `shape` as if it had `target_shape`.
///
/// Broadcast dimensions get a stride of 0. `target_shape` must be a valid
/// broadcast of `shape`.
#[must_use]
pub fn broadcast_strides(shape: &[usize], strides: &[isize], target_shape: &[usize]) -> Strides {
    let shape_offset = target_shape.len() - shape.len();

    target_shape
        .iter()
        .enumerate()
        .map(|(i, &target_dim)| {
            if i < shape_offset {
                return 0;
            }
            let orig = i - shape_offset;
            if shape[orig] == 1 && target_dim != 1 {
                0
            } else {
                strides[orig]
            }
        })
        .collect()
}

/// Shape that places a length-`len` vector on `axis` of a rank-`ndim` tensor.
///
/// Every other dimension is 1, so the result broadcasts against any tensor of
/// rank `ndim` whose `axis` dimension equals `len`. A rank-0 target yields
/// `[len]`.
pub fn axis_aligned_shape(len: usize, axis: usize, ndim: usize) -> Result<Shape> {
    if ndim == 0 {
        return Ok(Shape::from_slice(&[len]));
    }
    if axis >= ndim {
        return Err(Error::InvalidDimension {
            index: axis as i64,
            ndim,
        });
    }

    let mut shape = Shape::from_elem(1, ndim);
    shape[axis] = len;
    Ok(shape)
}

// =============================================================================
// Shape Manipulation
// =============================================================================

/// Resolves a reshape target, validating that total elements match.
///
/// Supports -1 in one dimension to infer the size.
pub fn reshape(old_shape: &[usize], new_shape: &[isize]) -> Result<Shape> {
    let old_numel = numel(old_shape);
    let mut result = Shape::with_capacity(new_shape.len());
    let mut infer_idx = None;
    let mut known_numel = 1usize;

    for (i, &dim) in new_shape.iter().enumerate() {
        match dim {
            -1 if infer_idx.is_some() => {
                return Err(Error::invalid_operation("Can only have one -1 in reshape"));
            }
            -1 => {
                infer_idx = Some(i);
                result.push(0);
            }
            d if d < 0 => {
                return Err(Error::invalid_operation("Invalid dimension in reshape"));
            }
            d => {
                known_numel *= d as usize;
                result.push(d as usize);
            }
        }
    }

    if let Some(idx) = infer_idx {
        if known_numel == 0 || old_numel % known_numel != 0 {
            return Err(Error::invalid_operation(
                "Cannot infer dimension: not evenly divisible",
            ));
        }
        result[idx] = old_numel / known_numel;
    } else if known_numel != old_numel {
        return Err(Error::shape_mismatch(old_shape, &result));
    }

    Ok(result)
}

// =============================================================================
// Validation
// =============================================================================

/// Normalizes a dimension index, supporting negative indexing.
pub fn normalize_dim(dim: i64, ndim: usize) -> Result<usize> {
    let ndim_i64 = ndim as i64;
    let normalized = if dim < 0 { dim + ndim_i64 } else { dim };

    if normalized < 0 || normalized >= ndim_i64 {
        return Err(Error::InvalidDimension { index: dim, ndim });
    }

    Ok(normalized as usize)
}

// =============================================================================
// Tests
// =============================================================================
