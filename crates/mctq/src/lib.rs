//! # MCTQ - Fake Quantization in Pure Rust
//!
//! Deterministic fake-quantization transforms for simulating reduced-precision
//! inference on floating-point tensors. Outputs stay `f32`; only the set of
//! values they can take shrinks.
//!
//! ## Schemes
//!
//! - **Symmetric** and **power-of-two** thresholds, signed or unsigned
//! - **Uniform** `[min, max]` ranges
//! - **Look-up-table** quantization onto integer cluster centers
//!
//! Each scheme works per tensor or per channel along any axis.
//!
//! # Quick Start
//!
//! ```rust
//! use mctq::prelude::*;
//!
//! let config = QuantizerConfig::new(8).with_per_channel(-1, 2);
//! let quantizer = Quantizer::power_of_two(config, vec![1.0, 4.0]).unwrap();
//!
//! let x = Tensor::from_vec(vec![0.3, 0.3, -7.0, 7.0], &[2, 2]).unwrap();
//! let y = quantizer.quantize(&x).unwrap();
//! assert_eq!(y.shape(), x.shape());
//! ```
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

// =============================================================================
// Re-exports
// =============================================================================

pub use mctq_quant as quant;
pub use mctq_tensor as tensor;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for quantizing tensors.
///
/// ```rust
/// use mctq::prelude::*;
/// ```
pub mod prelude {
    // Tensors
    pub use mctq_tensor::{uniform_seeded, Tensor};

    // Quantizers
    pub use mctq_quant::{
        compute_quantization_stats, Advisory, ConfigError, Granularity, QuantError, QuantParams,
        QuantResult, QuantizationScheme, QuantizationStats, Quantizer, QuantizerConfig,
    };
}

// =============================================================================
// Version Information
// =============================================================================

/// Returns the version of the library.
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// Tests
// =============================================================================
