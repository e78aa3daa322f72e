//! MCTQ Quant - Inferable Fake-Quantizers
//!
//! Maps floating-point tensors onto a small set of representable values and
//! returns them still in floating point. Supported schemes:
//!
//! - **Symmetric**: uniform grid around zero with an arbitrary threshold
//! - **Power-of-two**: symmetric grid whose threshold is a power of two
//! - **Uniform**: uniform grid over an arbitrary `[min, max]` range
//! - **LUT symmetric / LUT power-of-two**: nearest integer cluster center,
//!   rescaled by the threshold
//!
//! Every scheme works per tensor or per channel along a chosen axis. The
//! per-channel grids and cluster tables stay internal; [`Quantizer`] is the
//! only way to build one, so every model it applies has passed validation.
//!
//! # Example
//! ```rust
//! use mctq_quant::{Quantizer, QuantizerConfig};
//! use mctq_tensor::Tensor;
//!
//! let quantizer = Quantizer::symmetric(QuantizerConfig::new(3), vec![4.0]).unwrap();
//! let input = Tensor::from_vec(vec![3.4, -5.0], &[2]).unwrap();
//! let output = quantizer.quantize(&input).unwrap();
//! assert_eq!(output.to_vec(), vec![3.0, -4.0]);
//! ```
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
mod lut;
pub mod quantize;
pub mod quantizer;
mod threshold;
pub mod types;
pub mod validate;

pub use error::{Advisory, ConfigError, QuantError, QuantResult};
pub use quantize::{compute_quantization_stats, distinct_values, QuantizationStats};
pub use quantizer::Quantizer;
pub use types::{Granularity, QuantParams, QuantizationScheme, QuantizerConfig};
pub use validate::is_power_of_two;

// =============================================================================
// Constants
// =============================================================================

/// Default quantization bit width.
pub const DEFAULT_NUM_BITS: u32 = 8;

/// Default bit width of the look-up-table multiplier.
pub const DEFAULT_MULTIPLIER_N_BITS: u32 = 8;

/// Default `eps` added to look-up-table thresholds.
pub const DEFAULT_EPS: f32 = 1e-8;

/// Largest supported bit width; integer grids up to `2^24` are exact in `f32`.
pub const MAX_NUM_BITS: u32 = 24;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(DEFAULT_NUM_BITS <= DEFAULT_MULTIPLIER_N_BITS);
        assert!(DEFAULT_MULTIPLIER_N_BITS <= MAX_NUM_BITS);
        assert!(DEFAULT_EPS > 0.0);
    }
}
