//! Parameter Validation
//!
//! Checks a quantizer's construction arguments against the rules of its
//! scheme. Validation is pure: it returns either the first violated rule or
//! the list of non-fatal advisories, and never logs.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use mctq_tensor::normalize_dim;

use crate::error::{Advisory, ConfigError};
use crate::types::{Granularity, QuantParams, QuantizationScheme, QuantizerConfig};
use crate::MAX_NUM_BITS;

// =============================================================================
// Validation Result
// =============================================================================

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    /// Channel axis normalized to `0..input_rank`, when per-channel.
    pub channel_axis: Option<usize>,
    /// Non-fatal findings.
    pub advisories: Vec<Advisory>,
}

// =============================================================================
// Public API
// =============================================================================

/// Validates a quantizer's construction arguments.
///
/// Rules are checked in a fixed order (bit widths, parameter presence,
/// channel configuration, thresholds or ranges, cluster centers) and the first
/// violation is returned.
pub fn validate(
    scheme: QuantizationScheme,
    config: &QuantizerConfig,
    params: &QuantParams,
    cluster_centers: Option<&[f32]>,
) -> Result<Validated, ConfigError> {
    validate_bit_width("num_bits", config.num_bits)?;
    if scheme.is_lut() {
        validate_bit_width("multiplier_n_bits", config.multiplier_n_bits)?;
        if !config.eps.is_finite() || config.eps < 0.0 {
            return Err(ConfigError::InvalidEps(config.eps));
        }
    }

    match (scheme.uses_range(), params) {
        (true, QuantParams::Threshold(_)) => {
            return Err(ConfigError::MissingParameter {
                scheme,
                name: "min_range and max_range",
            })
        }
        (false, QuantParams::Range { .. }) => {
            return Err(ConfigError::MissingParameter {
                scheme,
                name: "threshold",
            })
        }
        _ => {}
    }
    match (scheme.is_lut(), cluster_centers.is_some()) {
        (true, false) => {
            return Err(ConfigError::MissingParameter {
                scheme,
                name: "cluster_centers",
            })
        }
        (false, true) => {
            return Err(ConfigError::UnexpectedParameter {
                scheme,
                name: "cluster_centers",
            })
        }
        _ => {}
    }

    let channel_axis = validate_channels(config)?;

    match params {
        QuantParams::Threshold(threshold) => validate_threshold(scheme, config, threshold)?,
        QuantParams::Range {
            min_range,
            max_range,
        } => validate_range(config, min_range, max_range)?,
    }

    let advisories = match cluster_centers {
        Some(centers) => validate_cluster_centers(config, centers)?,
        None => Vec::new(),
    };

    Ok(Validated {
        channel_axis,
        advisories,
    })
}

/// Returns true if `value` is an exact (possibly negative-exponent) power of two.
pub fn is_power_of_two(value: f32) -> bool {
    if !value.is_finite() || value <= 0.0 {
        return false;
    }
    let exponent = value.log2();
    exponent == exponent.round()
}

/// Returns `2^bits` as an exact float.
pub(crate) fn pow2(bits: u32) -> f32 {
    (1u64 << bits) as f32
}

/// Inclusive integer range a cluster center may take for the given
/// multiplier bit width.
pub(crate) fn multiplier_range(signed: bool, multiplier_n_bits: u32) -> (f32, f32) {
    if signed {
        let half = pow2(multiplier_n_bits - 1);
        (-half, half - 1.0)
    } else {
        (0.0, pow2(multiplier_n_bits) - 1.0)
    }
}

// =============================================================================
// Rules
// =============================================================================

fn validate_bit_width(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_NUM_BITS {
        return Err(ConfigError::InvalidBitWidth {
            field,
            value,
            max: MAX_NUM_BITS,
        });
    }
    Ok(())
}

fn validate_channels(config: &QuantizerConfig) -> Result<Option<usize>, ConfigError> {
    if !config.per_channel {
        return Ok(None);
    }

    let axis = config.channel_axis.ok_or(ConfigError::MissingChannelAxis)?;
    let input_rank = config.input_rank.ok_or(ConfigError::MissingInputRank)?;

    normalize_dim(axis, input_rank)
        .map(Some)
        .map_err(|_| ConfigError::InvalidChannelAxis { axis, input_rank })
}

fn validate_length(
    config: &QuantizerConfig,
    field: &'static str,
    values: &[f32],
) -> Result<(), ConfigError> {
    match config.granularity() {
        Granularity::PerTensor if values.len() != 1 => Err(ConfigError::WrongThresholdLength {
            granularity: Granularity::PerTensor,
            field,
            expected: 1,
            actual: values.len(),
        }),
        Granularity::PerChannel if values.is_empty() => Err(ConfigError::EmptyThreshold { field }),
        _ => Ok(()),
    }
}

fn validate_threshold(
    scheme: QuantizationScheme,
    config: &QuantizerConfig,
    threshold: &[f32],
) -> Result<(), ConfigError> {
    validate_length(config, "threshold", threshold)?;

    let invalid: Vec<f32> = threshold
        .iter()
        .copied()
        .filter(|t| !t.is_finite() || *t <= 0.0)
        .collect();
    if !invalid.is_empty() {
        return Err(ConfigError::InvalidThreshold { values: invalid });
    }

    if scheme.requires_power_of_two() {
        let offending: Vec<f32> = threshold
            .iter()
            .copied()
            .filter(|&t| !is_power_of_two(t))
            .collect();
        if !offending.is_empty() {
            return Err(ConfigError::NotPowerOfTwo { values: offending });
        }
    }

    Ok(())
}

fn validate_range(
    config: &QuantizerConfig,
    min_range: &[f32],
    max_range: &[f32],
) -> Result<(), ConfigError> {
    validate_length(config, "min_range", min_range)?;
    validate_length(config, "max_range", max_range)?;

    if min_range.len() != max_range.len() {
        return Err(ConfigError::RangeLengthMismatch {
            min_len: min_range.len(),
            max_len: max_range.len(),
        });
    }

    for (channel, (&min, &max)) in min_range.iter().zip(max_range.iter()).enumerate() {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ConfigError::InvalidRange { channel, min, max });
        }
    }

    Ok(())
}

fn validate_cluster_centers(
    config: &QuantizerConfig,
    centers: &[f32],
) -> Result<Vec<Advisory>, ConfigError> {
    if centers.is_empty() {
        return Err(ConfigError::EmptyClusterCenters);
    }

    let fractional: Vec<f32> = centers
        .iter()
        .copied()
        .filter(|c| !c.is_finite() || c.fract() != 0.0)
        .collect();
    if !fractional.is_empty() {
        return Err(ConfigError::NonIntegerClusterCenters { values: fractional });
    }

    let limit = 1usize << config.num_bits;
    if centers.len() > limit {
        return Err(ConfigError::TooManyClusterCenters {
            limit,
            actual: centers.len(),
        });
    }

    let mut advisories = Vec::new();
    if config.num_bits > config.multiplier_n_bits {
        return Err(ConfigError::BitWidthExceedsMultiplier {
            num_bits: config.num_bits,
            multiplier_n_bits: config.multiplier_n_bits,
        });
    } else if config.num_bits == config.multiplier_n_bits {
        advisories.push(Advisory::BitWidthEqualsMultiplier {
            num_bits: config.num_bits,
        });
    }

    if !config.signed {
        let negative: Vec<f32> = centers.iter().copied().filter(|&c| c < 0.0).collect();
        if !negative.is_empty() {
            return Err(ConfigError::UnsignedClusterCentersNegative { values: negative });
        }
    }

    let (min, max) = multiplier_range(config.signed, config.multiplier_n_bits);
    let outside: Vec<f32> = centers
        .iter()
        .copied()
        .filter(|&c| c < min || c > max)
        .collect();
    if !outside.is_empty() {
        return Err(ConfigError::ClusterCentersOutOfRange {
            values: outside,
            min,
            max,
        });
    }

    Ok(advisories)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lut_pot(config: &QuantizerConfig, threshold: &[f32], centers: &[f32]) -> Result<Validated, ConfigError> {
        validate(
            QuantizationScheme::LutPowerOfTwo,
            config,
            &QuantParams::Threshold(threshold.to_vec()),
            Some(centers),
        )
    }

    #[test]
    fn test_is_power_of_two() {
        assert!(is_power_of_two(1.0));
        assert!(is_power_of_two(4.0));
        assert!(is_power_of_two(0.25));
        assert!(!is_power_of_two(3.0));
        assert!(!is_power_of_two(0.0));
        assert!(!is_power_of_two(-2.0));
        assert!(!is_power_of_two(f32::INFINITY));
    }

    #[test]
    fn test_multiplier_range() {
        assert_eq!(multiplier_range(true, 8), (-128.0, 127.0));
        assert_eq!(multiplier_range(false, 8), (0.0, 255.0));
        assert_eq!(multiplier_range(true, 3), (-4.0, 3.0));
    }

    #[test]
    fn test_missing_channel_fields() {
        let mut config = QuantizerConfig::new(8);
        config.per_channel = true;
        config.input_rank = Some(4);
        let params = QuantParams::Threshold(vec![1.0, 2.0]);
        assert_eq!(
            validate(QuantizationScheme::Symmetric, &config, &params, None),
            Err(ConfigError::MissingChannelAxis)
        );

        config.channel_axis = Some(3);
        config.input_rank = None;
        assert_eq!(
            validate(QuantizationScheme::Symmetric, &config, &params, None),
            Err(ConfigError::MissingInputRank)
        );

        config.input_rank = Some(2);
        assert_eq!(
            validate(QuantizationScheme::Symmetric, &config, &params, None),
            Err(ConfigError::InvalidChannelAxis {
                axis: 3,
                input_rank: 2
            })
        );
    }

    #[test]
    fn test_normalizes_negative_axis() {
        let config = QuantizerConfig::new(8).with_per_channel(-1, 4);
        let validated = validate(
            QuantizationScheme::Symmetric,
            &config,
            &QuantParams::Threshold(vec![1.0, 2.0, 3.0]),
            None,
        )
        .unwrap();
        assert_eq!(validated.channel_axis, Some(3));
    }

    #[test]
    fn test_per_tensor_threshold_length() {
        let config = QuantizerConfig::new(3);
        let err = lut_pot(&config, &[4.0, 2.0], &[25.0]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::WrongThresholdLength {
                granularity: Granularity::PerTensor,
                field: "threshold",
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_power_of_two_reports_values() {
        let config = QuantizerConfig::new(8);
        let err = lut_pot(&config, &[3.0], &[25.0, 85.0]).unwrap_err();
        assert_eq!(err, ConfigError::NotPowerOfTwo { values: vec![3.0] });
        assert!(err.to_string().ends_with("[3.0]"));

        let config = QuantizerConfig::new(8).with_per_channel(0, 2);
        let err = validate(
            QuantizationScheme::PowerOfTwo,
            &config,
            &QuantParams::Threshold(vec![2.0, 6.0, 0.5, 5.0]),
            None,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::NotPowerOfTwo { values: vec![6.0, 5.0] });
    }

    #[test]
    fn test_non_positive_threshold() {
        let config = QuantizerConfig::new(8);
        let err = validate(
            QuantizationScheme::Symmetric,
            &config,
            &QuantParams::Threshold(vec![-1.0]),
            None,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidThreshold { values: vec![-1.0] });
    }

    #[test]
    fn test_cluster_center_rules() {
        let config = QuantizerConfig::new(8);
        assert_eq!(
            lut_pot(&config, &[4.0], &[25.9, 85.0]).unwrap_err(),
            ConfigError::NonIntegerClusterCenters { values: vec![25.9] }
        );

        let config = QuantizerConfig::new(2);
        assert_eq!(
            lut_pot(&config, &[4.0], &[-25.0, 25.0, 12.0, 45.0, 11.0]).unwrap_err(),
            ConfigError::TooManyClusterCenters { limit: 4, actual: 5 }
        );

        let config = QuantizerConfig::new(2).with_multiplier_n_bits(3);
        assert_eq!(
            lut_pot(&config, &[4.0], &[50.0]).unwrap_err(),
            ConfigError::ClusterCentersOutOfRange {
                values: vec![50.0],
                min: -4.0,
                max: 3.0
            }
        );

        let config = QuantizerConfig::new(8).with_signed(false);
        assert_eq!(
            lut_pot(&config, &[2.0], &[-25.0, 85.0]).unwrap_err(),
            ConfigError::UnsignedClusterCentersNegative { values: vec![-25.0] }
        );

        assert_eq!(
            lut_pot(&QuantizerConfig::new(8), &[4.0], &[]).unwrap_err(),
            ConfigError::EmptyClusterCenters
        );
    }

    #[test]
    fn test_bit_width_against_multiplier() {
        let config = QuantizerConfig::new(10).with_multiplier_n_bits(8);
        let err = lut_pot(&config, &[4.0], &[25.0]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Look-Up-Table bit configuration has 10 bits. It must be less than 8"
        );

        let config = QuantizerConfig::new(8).with_multiplier_n_bits(8);
        let validated = lut_pot(&config, &[4.0], &[25.0]).unwrap();
        assert_eq!(
            validated.advisories,
            vec![Advisory::BitWidthEqualsMultiplier { num_bits: 8 }]
        );

        let config = QuantizerConfig::new(3);
        assert!(lut_pot(&config, &[4.0], &[25.0]).unwrap().advisories.is_empty());
    }

    #[test]
    fn test_bit_width_bounds() {
        let config = QuantizerConfig::new(0);
        let err = validate(
            QuantizationScheme::Symmetric,
            &config,
            &QuantParams::Threshold(vec![1.0]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBitWidth { field: "num_bits", .. }));
    }

    #[test]
    fn test_uniform_range_rules() {
        let config = QuantizerConfig::new(4);
        let range = |min: Vec<f32>, max: Vec<f32>| QuantParams::Range {
            min_range: min,
            max_range: max,
        };

        assert!(validate(QuantizationScheme::Uniform, &config, &range(vec![-1.0], vec![1.0]), None).is_ok());
        assert_eq!(
            validate(QuantizationScheme::Uniform, &config, &range(vec![2.0], vec![1.0]), None),
            Err(ConfigError::InvalidRange {
                channel: 0,
                min: 2.0,
                max: 1.0
            })
        );

        let config = QuantizerConfig::new(4).with_per_channel(1, 2);
        assert_eq!(
            validate(
                QuantizationScheme::Uniform,
                &config,
                &range(vec![0.0, 1.0], vec![1.0]),
                None
            ),
            Err(ConfigError::RangeLengthMismatch { min_len: 2, max_len: 1 })
        );
    }

    #[test]
    fn test_parameter_presence() {
        let config = QuantizerConfig::new(4);
        assert!(matches!(
            validate(
                QuantizationScheme::Uniform,
                &config,
                &QuantParams::Threshold(vec![1.0]),
                None
            ),
            Err(ConfigError::MissingParameter { .. })
        ));
        assert!(matches!(
            validate(
                QuantizationScheme::Symmetric,
                &config,
                &QuantParams::Threshold(vec![1.0]),
                Some(&[1.0][..])
            ),
            Err(ConfigError::UnexpectedParameter { .. })
        ));
        assert!(matches!(
            validate(
                QuantizationScheme::LutSymmetric,
                &config,
                &QuantParams::Threshold(vec![1.0]),
                None
            ),
            Err(ConfigError::MissingParameter { .. })
        ));
    }
}
