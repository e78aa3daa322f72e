//! Quantization Types
//!
//! Schemes, granularity, the numeric configuration shared by every quantizer,
//! and the threshold/range parameters a quantizer is built from.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{DEFAULT_EPS, DEFAULT_MULTIPLIER_N_BITS, DEFAULT_NUM_BITS};

// =============================================================================
// Quantization Scheme
// =============================================================================

/// The closed set of supported quantization schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizationScheme {
    /// Uniform grid symmetric around zero with an arbitrary positive threshold.
    Symmetric,
    /// Symmetric grid whose threshold is a power of two.
    PowerOfTwo,
    /// Uniform grid over an arbitrary `[min_range, max_range]`.
    Uniform,
    /// Look-up-table of integer cluster centers with an arbitrary threshold.
    LutSymmetric,
    /// Look-up-table of integer cluster centers with a power-of-two threshold.
    LutPowerOfTwo,
}

impl QuantizationScheme {
    /// All schemes, in declaration order.
    pub const ALL: [QuantizationScheme; 5] = [
        QuantizationScheme::Symmetric,
        QuantizationScheme::PowerOfTwo,
        QuantizationScheme::Uniform,
        QuantizationScheme::LutSymmetric,
        QuantizationScheme::LutPowerOfTwo,
    ];

    /// Returns the stable name of this scheme.
    pub fn name(&self) -> &'static str {
        match self {
            QuantizationScheme::Symmetric => "symmetric",
            QuantizationScheme::PowerOfTwo => "power_of_two",
            QuantizationScheme::Uniform => "uniform",
            QuantizationScheme::LutSymmetric => "lut_symmetric",
            QuantizationScheme::LutPowerOfTwo => "lut_power_of_two",
        }
    }

    /// Returns true if outputs come from a cluster-center look-up table.
    pub fn is_lut(&self) -> bool {
        matches!(
            self,
            QuantizationScheme::LutSymmetric | QuantizationScheme::LutPowerOfTwo
        )
    }

    /// Returns true if thresholds must be powers of two.
    pub fn requires_power_of_two(&self) -> bool {
        matches!(
            self,
            QuantizationScheme::PowerOfTwo | QuantizationScheme::LutPowerOfTwo
        )
    }

    /// Returns true if the scheme is parameterized by `[min_range, max_range]`
    /// instead of a threshold.
    pub fn uses_range(&self) -> bool {
        matches!(self, QuantizationScheme::Uniform)
    }
}

impl fmt::Display for QuantizationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QuantizationScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "symmetric" => Ok(QuantizationScheme::Symmetric),
            "power_of_two" | "pot" => Ok(QuantizationScheme::PowerOfTwo),
            "uniform" => Ok(QuantizationScheme::Uniform),
            "lut_symmetric" => Ok(QuantizationScheme::LutSymmetric),
            "lut_power_of_two" | "lut_pot" => Ok(QuantizationScheme::LutPowerOfTwo),
            _ => Err(ConfigError::UnknownScheme(s.to_string())),
        }
    }
}

// =============================================================================
// Granularity
// =============================================================================

/// Whether one threshold covers the whole tensor or one per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// One shared threshold.
    PerTensor,
    /// One threshold per slice along the channel axis.
    PerChannel,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::PerTensor => f.write_str("per-tensor"),
            Granularity::PerChannel => f.write_str("per-channel"),
        }
    }
}

// =============================================================================
// Quantizer Configuration
// =============================================================================

/// Numeric configuration shared by all quantizer schemes.
///
/// `multiplier_n_bits` and `eps` only affect look-up-table schemes and
/// `signed` is ignored by the uniform scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizerConfig {
    /// Quantization bit width.
    pub num_bits: u32,
    /// Signed (symmetric around zero) or unsigned (non-negative) grid.
    pub signed: bool,
    /// One threshold per channel instead of one per tensor.
    pub per_channel: bool,
    /// Channel axis; negative values count from the last axis.
    pub channel_axis: Option<i64>,
    /// Rank of the tensors this quantizer is applied to.
    pub input_rank: Option<usize>,
    /// Bit width of the fixed-point multiplier that holds cluster centers.
    pub multiplier_n_bits: u32,
    /// Added to the threshold before dividing by it.
    pub eps: f32,
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            num_bits: DEFAULT_NUM_BITS,
            signed: true,
            per_channel: false,
            channel_axis: None,
            input_rank: None,
            multiplier_n_bits: DEFAULT_MULTIPLIER_N_BITS,
            eps: DEFAULT_EPS,
        }
    }
}

impl QuantizerConfig {
    /// Creates a signed per-tensor configuration with the given bit width.
    pub fn new(num_bits: u32) -> Self {
        Self {
            num_bits,
            ..Self::default()
        }
    }

    /// Sets signedness.
    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    /// Switches to per-channel quantization along `channel_axis` of
    /// rank-`input_rank` inputs.
    pub fn with_per_channel(mut self, channel_axis: i64, input_rank: usize) -> Self {
        self.per_channel = true;
        self.channel_axis = Some(channel_axis);
        self.input_rank = Some(input_rank);
        self
    }

    /// Sets the multiplier bit width.
    pub fn with_multiplier_n_bits(mut self, multiplier_n_bits: u32) -> Self {
        self.multiplier_n_bits = multiplier_n_bits;
        self
    }

    /// Sets `eps`.
    pub fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    /// Returns the configured granularity.
    pub fn granularity(&self) -> Granularity {
        if self.per_channel {
            Granularity::PerChannel
        } else {
            Granularity::PerTensor
        }
    }
}

// =============================================================================
// Quantization Parameters
// =============================================================================

/// Per-channel thresholds or ranges a quantizer is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantParams {
    /// Symmetric family: one positive threshold per channel.
    Threshold(Vec<f32>),
    /// Uniform: one `[min, max]` pair per channel.
    Range {
        /// Lower bounds.
        min_range: Vec<f32>,
        /// Upper bounds.
        max_range: Vec<f32>,
    },
}

impl QuantParams {
    /// Returns the number of channels described.
    pub fn num_channels(&self) -> usize {
        match self {
            QuantParams::Threshold(threshold) => threshold.len(),
            QuantParams::Range { min_range, .. } => min_range.len(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_properties() {
        assert!(QuantizationScheme::LutPowerOfTwo.is_lut());
        assert!(QuantizationScheme::LutPowerOfTwo.requires_power_of_two());
        assert!(!QuantizationScheme::Symmetric.requires_power_of_two());
        assert!(QuantizationScheme::Uniform.uses_range());
        assert!(!QuantizationScheme::Uniform.is_lut());
    }

    #[test]
    fn test_scheme_from_str() {
        for scheme in QuantizationScheme::ALL {
            assert_eq!(scheme.name().parse::<QuantizationScheme>().unwrap(), scheme);
        }
        assert_eq!(
            "POT".parse::<QuantizationScheme>().unwrap(),
            QuantizationScheme::PowerOfTwo
        );
        assert_eq!(
            "lut-pot".parse::<QuantizationScheme>().unwrap(),
            QuantizationScheme::LutPowerOfTwo
        );
        assert!(matches!(
            "int8".parse::<QuantizationScheme>(),
            Err(ConfigError::UnknownScheme(_))
        ));
    }

    #[test]
    fn test_scheme_serde_names() {
        let json = serde_json::to_string(&QuantizationScheme::LutSymmetric).unwrap();
        assert_eq!(json, "\"lut_symmetric\"");
    }

    #[test]
    fn test_config_defaults() {
        let config = QuantizerConfig::default();
        assert_eq!(config.num_bits, 8);
        assert_eq!(config.multiplier_n_bits, 8);
        assert_eq!(config.eps, 1e-8);
        assert!(config.signed);
        assert_eq!(config.granularity(), Granularity::PerTensor);

        let config = QuantizerConfig::new(4).with_per_channel(-1, 4).with_signed(false);
        assert_eq!(config.granularity(), Granularity::PerChannel);
        assert_eq!(config.channel_axis, Some(-1));
        assert_eq!(config.input_rank, Some(4));
        assert!(!config.signed);
    }

    #[test]
    fn test_config_deserialize_fills_defaults() {
        let config: QuantizerConfig = serde_json::from_str(r#"{"num_bits": 3}"#).unwrap();
        assert_eq!(config.num_bits, 3);
        assert_eq!(config.multiplier_n_bits, DEFAULT_MULTIPLIER_N_BITS);
        assert!(config.channel_axis.is_none());
    }
}
