//! Tensor - Core N-Dimensional Array Type
//!
//! The `Tensor` struct is the value type exchanged with the quantizers: an
//! owned, row-major, N-dimensional array. Operations never mutate their input;
//! every transform returns a new tensor.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use core::fmt;

use crate::error::{Error, Result};
use crate::shape::{
    broadcast_shape, broadcast_strides, contiguous_strides, linear_index, numel, reshape,
    unravel_index, Shape, Strides,
};

// =============================================================================
// Scalar Trait
// =============================================================================

/// Element types that can be stored in a tensor.
pub trait Scalar: Copy + Default + fmt::Debug + PartialEq + Send + Sync + 'static {}

impl<T> Scalar for T where T: Copy + Default + fmt::Debug + PartialEq + Send + Sync + 'static {}

// =============================================================================
// Tensor Struct
// =============================================================================

/// An owned N-dimensional array stored contiguously in row-major order.
#[derive(Clone, PartialEq)]
pub struct Tensor<T: Scalar> {
    /// Elements in row-major order.
    pub(crate) data: Vec<T>,
    /// Shape of the tensor (dimensions).
    pub(crate) shape: Shape,
    /// Row-major strides for each dimension.
    pub(crate) strides: Strides,
}

impl<T: Scalar> Tensor<T> {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a new tensor from a vector with the given shape.
    ///
    /// # Returns
    /// New tensor, or error if shape doesn't match data length.
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        let total = numel(shape);
        if total != data.len() {
            return Err(Error::shape_mismatch(shape, &[data.len()]));
        }

        let shape = Shape::from_slice(shape);
        let strides = contiguous_strides(&shape);

        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the shape of the tensor.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the strides of the tensor.
    #[must_use]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the tensor has zero elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // =========================================================================
    // Element Access
    // =========================================================================

    /// Returns the elements in row-major order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns a copy of the elements in row-major order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }

    // =========================================================================
    // Shape Operations
    // =========================================================================

    /// Returns a tensor with the same elements and a new shape.
    ///
    /// Supports -1 in one dimension to infer the size.
    pub fn reshape(&self, new_shape: &[isize]) -> Result<Self> {
        let shape = reshape(&self.shape, new_shape)?;
        Self::from_vec(self.data.clone(), &shape)
    }

    /// Flattens to one dimension.
    #[must_use]
    pub fn flatten(&self) -> Self {
        Self {
            data: self.data.clone(),
            shape: Shape::from_slice(&[self.numel()]),
            strides: Strides::from_slice(&[1]),
        }
    }

    /// Materializes this tensor broadcast to `shape`.
    ///
    /// Dimensions of size 1 are repeated; `shape` itself must already be the
    /// broadcast result, otherwise a `BroadcastError` is returned.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self> {
        if self.shape.as_slice() == shape {
            return Ok(self.clone());
        }

        let result_shape = broadcast_shape(&self.shape, shape)?;
        if result_shape.as_slice() != shape {
            return Err(Error::BroadcastError {
                shape1: self.shape.to_vec(),
                shape2: shape.to_vec(),
            });
        }

        let src_strides = broadcast_strides(&self.shape, &self.strides, &result_shape);
        let data = (0..numel(&result_shape))
            .map(|i| {
                let indices = unravel_index(i, &result_shape);
                self.data[linear_index(&indices, &src_strides)]
            })
            .collect();

        Self::from_vec(data, &result_shape)
    }
}

// =============================================================================
// Formatting
// =============================================================================

impl<T: Scalar> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape.as_slice())
            .field("data", &self.data)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec() {
        let t = Tensor::<f32>::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.strides(), &[3, 1]);
        assert_eq!(t.ndim(), 2);
        assert_eq!(t.numel(), 6);
        assert_eq!(t.as_slice()[5], 6.0);
    }

    #[test]
    fn test_from_vec_reports_requested_shape_as_expected() {
        let err = Tensor::<f32>::from_vec(vec![1.0, 2.0], &[3, 2]).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                expected: vec![3, 2],
                actual: vec![2],
            }
        );
    }

    #[test]
    fn test_reshape_and_flatten() {
        let t = Tensor::<f32>::from_vec((0..12).map(|x| x as f32).collect(), &[3, 4]).unwrap();
        let r = t.reshape(&[2, -1]).unwrap();
        assert_eq!(r.shape(), &[2, 6]);
        assert_eq!(r.as_slice()[6], 6.0);
        assert_eq!(t.flatten().shape(), &[12]);
    }

    #[test]
    fn test_broadcast_to_along_axis() {
        let c = Tensor::<usize>::from_vec(vec![0, 1, 2], &[1, 3, 1]).unwrap();
        let b = c.broadcast_to(&[2, 3, 2]).unwrap();
        assert_eq!(b.to_vec(), vec![0, 0, 1, 1, 2, 2, 0, 0, 1, 1, 2, 2]);

        assert!(c.broadcast_to(&[2, 4, 2]).is_err());
        // The target may not itself be expanded.
        assert!(c.broadcast_to(&[3]).is_err());
    }
}
