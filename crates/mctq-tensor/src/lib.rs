//! MCTQ Tensor - N-Dimensional Array for Fake Quantization
//!
//! This crate provides the `Tensor` value type that the quantizers in
//! `mctq-quant` consume and produce. It is deliberately small: an owned,
//! row-major array with shape utilities and `NumPy`-style broadcasting, enough
//! to line a per-channel parameter vector up with any axis of an input.
//!
//! # Key Features
//! - N-dimensional tensor with arbitrary shape
//! - Broadcasting of size-1 dimensions
//! - Axis-aligned shapes for per-channel parameters
//! - Seeded random inputs for reproducible experiments
//!
//! # Example
//! ```rust
//! use mctq_tensor::{axis_aligned_shape, Tensor};
//!
//! let channels = Tensor::from_vec(vec![0usize, 1, 2], &axis_aligned_shape(3, 1, 3).unwrap()).unwrap();
//! let expanded = channels.broadcast_to(&[2, 3, 2]).unwrap();
//! assert_eq!(expanded.to_vec(), vec![0, 0, 1, 1, 2, 2, 0, 0, 1, 1, 2, 2]);
//! ```
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// ML/tensor-specific allowances
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::neg_cmp_op_on_partial_ord)]

// =============================================================================
// Modules
// =============================================================================

pub mod creation;
pub mod error;
pub mod shape;
pub mod tensor;

// =============================================================================
// Re-exports
// =============================================================================

pub use creation::{full, linspace, uniform_seeded, zeros};
pub use error::{Error, Result};
pub use shape::{axis_aligned_shape, normalize_dim, Shape, Strides};
pub use tensor::{Scalar, Tensor};

// =============================================================================
// Prelude
// =============================================================================

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::shape::{Shape, Strides};
    pub use crate::tensor::{Scalar, Tensor};
    pub use crate::{full, linspace, uniform_seeded, zeros};
    pub use crate::{Error, Result};
}
