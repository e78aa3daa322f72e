//! Quantization Error Types
//!
//! Construction-time configuration errors, non-fatal advisories, and the
//! top-level error returned by quantize calls.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use std::fmt;

use thiserror::Error;

use crate::types::{Granularity, QuantizationScheme};

/// Result type for quantization operations.
pub type QuantResult<T> = Result<T, QuantError>;

// =============================================================================
// Configuration Errors
// =============================================================================

/// A quantizer's construction arguments were rejected.
///
/// Raised only while constructing a quantizer; a constructed quantizer never
/// produces one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Per-channel quantization without a channel axis.
    #[error("Channel axis is missing in per channel quantization")]
    MissingChannelAxis,

    /// Per-channel quantization without an input rank.
    #[error("Input rank is missing in per channel quantization")]
    MissingInputRank,

    /// The channel axis does not address a dimension of the input rank.
    #[error("Channel axis {axis} is out of range for input rank {input_rank}")]
    InvalidChannelAxis {
        /// Requested axis.
        axis: i64,
        /// Declared input rank.
        input_rank: usize,
    },

    /// A threshold or range was not supplied as a list of numbers.
    #[error("Expected {field} to be of type list but is {found}")]
    WrongThresholdType {
        /// Offending configuration key.
        field: String,
        /// Runtime type that was supplied instead.
        found: String,
    },

    /// A threshold or range vector has the wrong number of entries.
    #[error("In {granularity} quantization {field} should be of length {expected} but is {actual}")]
    WrongThresholdLength {
        /// Quantization granularity.
        granularity: Granularity,
        /// Offending parameter name.
        field: &'static str,
        /// Expected length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// A per-channel threshold or range vector is empty.
    #[error("Expected {field} to contain at least one value")]
    EmptyThreshold {
        /// Offending parameter name.
        field: &'static str,
    },

    /// Thresholds must be finite and strictly positive.
    #[error("Expected threshold to be finite and positive but is {values:?}")]
    InvalidThreshold {
        /// Offending threshold values.
        values: Vec<f32>,
    },

    /// Power-of-two schemes require every threshold to be an exact power of two.
    #[error("Expected threshold to be power of 2 but is {values:?}")]
    NotPowerOfTwo {
        /// Offending threshold values.
        values: Vec<f32>,
    },

    /// `min_range` and `max_range` differ in length.
    #[error("Expected min_range and max_range of equal length but got {min_len} and {max_len}")]
    RangeLengthMismatch {
        /// Length of `min_range`.
        min_len: usize,
        /// Length of `max_range`.
        max_len: usize,
    },

    /// A uniform range is empty, inverted or not finite.
    #[error("Expected min_range < max_range in channel {channel} but got [{min}, {max}]")]
    InvalidRange {
        /// Channel index.
        channel: usize,
        /// Supplied minimum.
        min: f32,
        /// Supplied maximum.
        max: f32,
    },

    /// No cluster centers were supplied to a look-up-table scheme.
    #[error("Expected at least one cluster center")]
    EmptyClusterCenters,

    /// Cluster centers must be integer valued.
    #[error("Expected cluster centers to be integers but got {values:?}")]
    NonIntegerClusterCenters {
        /// Offending centers.
        values: Vec<f32>,
    },

    /// More cluster centers than the bit width can address.
    #[error("Expected num of cluster centers to be less or equal than {limit} but got {actual}")]
    TooManyClusterCenters {
        /// `2^num_bits`.
        limit: usize,
        /// Supplied count.
        actual: usize,
    },

    /// Cluster centers outside the multiplier's integer range.
    #[error("Expected cluster centers in the quantization range [{min}, {max}] but got {values:?}")]
    ClusterCentersOutOfRange {
        /// Offending centers.
        values: Vec<f32>,
        /// Lowest representable center.
        min: f32,
        /// Highest representable center.
        max: f32,
    },

    /// Negative cluster centers in unsigned quantization.
    #[error("Expected unsigned cluster centers in unsigned quantization but got {values:?}")]
    UnsignedClusterCentersNegative {
        /// Offending centers.
        values: Vec<f32>,
    },

    /// The look-up-table bit width exceeds the multiplier bit width.
    #[error("Look-Up-Table bit configuration has {num_bits} bits. It must be less than {multiplier_n_bits}")]
    BitWidthExceedsMultiplier {
        /// Requested bit width.
        num_bits: u32,
        /// Multiplier bit width.
        multiplier_n_bits: u32,
    },

    /// A bit width outside the supported range.
    #[error("Expected {field} in [1, {max}] but got {value}")]
    InvalidBitWidth {
        /// Offending configuration key.
        field: &'static str,
        /// Supplied value.
        value: u32,
        /// Largest supported value.
        max: u32,
    },

    /// `eps` must be finite and non-negative.
    #[error("Expected eps to be finite and non-negative but got {0}")]
    InvalidEps(f32),

    /// A parameter the scheme requires was not supplied.
    #[error("{scheme} quantizer requires {name}")]
    MissingParameter {
        /// Scheme being constructed.
        scheme: QuantizationScheme,
        /// Missing parameter.
        name: &'static str,
    },

    /// A parameter the scheme does not accept was supplied.
    #[error("{scheme} quantizer does not accept {name}")]
    UnexpectedParameter {
        /// Scheme being constructed.
        scheme: QuantizationScheme,
        /// Unexpected parameter.
        name: &'static str,
    },

    /// Unknown scheme name.
    #[error("Unknown quantization scheme: {0}")]
    UnknownScheme(String),

    /// A configuration map entry could not be read.
    #[error("Invalid configuration field {field}: {message}")]
    InvalidField {
        /// Offending configuration key.
        field: String,
        /// What was wrong with it.
        message: String,
    },
}

// =============================================================================
// Advisories
// =============================================================================

/// Non-fatal construction-time findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// The look-up-table bit width equals the multiplier bit width.
    BitWidthEqualsMultiplier {
        /// Shared bit width.
        num_bits: u32,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::BitWidthEqualsMultiplier { num_bits } => write!(
                f,
                "Num of bits ({num_bits}) equal to multiplier n bits, Please be aware LUT quantizer \
                 may be inefficient in that case, consider using the symmetric quantizer instead"
            ),
        }
    }
}

// =============================================================================
// Quantization Errors
// =============================================================================

/// Errors that can occur while constructing or applying a quantizer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuantError {
    /// Invalid quantizer configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Tensor construction or broadcasting failed.
    #[error("Tensor error: {0}")]
    Tensor(#[from] mctq_tensor::Error),

    /// Input rank differs from the rank the quantizer was configured for.
    #[error("Input rank mismatch: quantizer expects rank {expected}, got {actual}")]
    RankMismatch {
        /// Configured input rank.
        expected: usize,
        /// Rank of the supplied tensor.
        actual: usize,
    },

    /// Channel dimension differs from the number of per-channel parameters.
    #[error("Channel mismatch on axis {axis}: quantizer has {expected} channels, tensor has {actual}")]
    ChannelMismatch {
        /// Normalized channel axis.
        axis: usize,
        /// Number of per-channel parameters.
        expected: usize,
        /// Size of the tensor's channel dimension.
        actual: usize,
    },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::NotPowerOfTwo { values: vec![3.0] };
        assert_eq!(err.to_string(), "Expected threshold to be power of 2 but is [3.0]");

        let err = ConfigError::TooManyClusterCenters { limit: 4, actual: 5 };
        assert_eq!(
            err.to_string(),
            "Expected num of cluster centers to be less or equal than 4 but got 5"
        );

        let err = ConfigError::WrongThresholdLength {
            granularity: Granularity::PerTensor,
            field: "threshold",
            expected: 1,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "In per-tensor quantization threshold should be of length 1 but is 2"
        );
    }

    #[test]
    fn test_quant_error_from_config() {
        let err: QuantError = ConfigError::MissingChannelAxis.into();
        assert_eq!(
            err.to_string(),
            "Channel axis is missing in per channel quantization"
        );
    }

    #[test]
    fn test_advisory_display() {
        let advisory = Advisory::BitWidthEqualsMultiplier { num_bits: 8 };
        assert!(advisory.to_string().contains("may be inefficient"));
    }
}
