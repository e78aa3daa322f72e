//! Quantizer
//!
//! The public entry point: a validated, immutable quantizer of one scheme
//! with a uniform construct / `get_config` / quantize contract.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use mctq_tensor::Tensor;
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::config;
use crate::error::{Advisory, ConfigError, QuantError, QuantResult};
use crate::lut::{ClusterTable, LutModel};
use crate::quantize::{quantize_tensor, ChannelKernel};
use crate::threshold::ThresholdModel;
use crate::types::{QuantParams, QuantizationScheme, QuantizerConfig};
use crate::validate::validate;

// =============================================================================
// Model
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Model {
    Threshold(ThresholdModel),
    Lut(LutModel),
}

impl Model {
    fn kernel(&self) -> &dyn ChannelKernel {
        match self {
            Model::Threshold(model) => model,
            Model::Lut(model) => model,
        }
    }
}

// =============================================================================
// Quantizer
// =============================================================================

/// A fake-quantizer of one scheme.
///
/// Constructed once from validated parameters; `quantize` never changes it,
/// so a quantizer can be shared freely between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantizer {
    scheme: QuantizationScheme,
    config: QuantizerConfig,
    params: QuantParams,
    cluster_centers: Option<Vec<f32>>,
    channel_axis: Option<usize>,
    advisories: Vec<Advisory>,
    model: Model,
}

impl Quantizer {
    /// Validates the arguments and builds a quantizer.
    ///
    /// `cluster_centers` is required by the look-up-table schemes and
    /// rejected by the others.
    pub fn new(
        scheme: QuantizationScheme,
        config: QuantizerConfig,
        params: QuantParams,
        cluster_centers: Option<Vec<f32>>,
    ) -> Result<Self, ConfigError> {
        let validated = validate(scheme, &config, &params, cluster_centers.as_deref())?;

        let model = match (&params, &cluster_centers) {
            (QuantParams::Threshold(threshold), Some(centers)) => {
                let table = ClusterTable::new(
                    centers.clone(),
                    config.signed,
                    config.num_bits,
                    config.multiplier_n_bits,
                    config.eps,
                );
                Model::Lut(LutModel::new(table, threshold))
            }
            (QuantParams::Threshold(threshold), None) => Model::Threshold(
                ThresholdModel::symmetric(threshold, config.num_bits, config.signed),
            ),
            (
                QuantParams::Range {
                    min_range,
                    max_range,
                },
                _,
            ) => Model::Threshold(ThresholdModel::uniform(
                min_range,
                max_range,
                config.num_bits,
            )),
        };

        for advisory in &validated.advisories {
            warn!(scheme = %scheme, "{advisory}");
        }
        debug!(
            scheme = %scheme,
            num_bits = config.num_bits,
            granularity = %config.granularity(),
            channels = params.num_channels(),
            "Constructed quantizer"
        );

        Ok(Self {
            scheme,
            config,
            params,
            cluster_centers,
            channel_axis: validated.channel_axis,
            advisories: validated.advisories,
            model,
        })
    }

    /// Symmetric quantizer with arbitrary positive thresholds.
    pub fn symmetric(config: QuantizerConfig, threshold: Vec<f32>) -> Result<Self, ConfigError> {
        Self::new(
            QuantizationScheme::Symmetric,
            config,
            QuantParams::Threshold(threshold),
            None,
        )
    }

    /// Symmetric quantizer whose thresholds are powers of two.
    pub fn power_of_two(config: QuantizerConfig, threshold: Vec<f32>) -> Result<Self, ConfigError> {
        Self::new(
            QuantizationScheme::PowerOfTwo,
            config,
            QuantParams::Threshold(threshold),
            None,
        )
    }

    /// Uniform quantizer over `[min_range, max_range]` per channel.
    pub fn uniform(
        config: QuantizerConfig,
        min_range: Vec<f32>,
        max_range: Vec<f32>,
    ) -> Result<Self, ConfigError> {
        Self::new(
            QuantizationScheme::Uniform,
            config,
            QuantParams::Range {
                min_range,
                max_range,
            },
            None,
        )
    }

    /// Look-up-table quantizer with arbitrary positive thresholds.
    pub fn lut_symmetric(
        config: QuantizerConfig,
        threshold: Vec<f32>,
        cluster_centers: Vec<f32>,
    ) -> Result<Self, ConfigError> {
        Self::new(
            QuantizationScheme::LutSymmetric,
            config,
            QuantParams::Threshold(threshold),
            Some(cluster_centers),
        )
    }

    /// Look-up-table quantizer whose thresholds are powers of two.
    pub fn lut_power_of_two(
        config: QuantizerConfig,
        threshold: Vec<f32>,
        cluster_centers: Vec<f32>,
    ) -> Result<Self, ConfigError> {
        Self::new(
            QuantizationScheme::LutPowerOfTwo,
            config,
            QuantParams::Threshold(threshold),
            Some(cluster_centers),
        )
    }

    /// Re-creates a quantizer from a map produced by [`Quantizer::get_config`].
    pub fn from_config(
        scheme: QuantizationScheme,
        map: &Map<String, Value>,
    ) -> Result<Self, ConfigError> {
        let parsed = config::from_map(scheme, map)?;
        Self::new(scheme, parsed.config, parsed.params, parsed.cluster_centers)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the scheme.
    pub fn scheme(&self) -> QuantizationScheme {
        self.scheme
    }

    /// Returns the numeric configuration as supplied.
    pub fn config(&self) -> &QuantizerConfig {
        &self.config
    }

    /// Returns the thresholds or ranges as supplied.
    pub fn params(&self) -> &QuantParams {
        &self.params
    }

    /// Returns the cluster centers of a look-up-table quantizer.
    pub fn cluster_centers(&self) -> Option<&[f32]> {
        self.cluster_centers.as_deref()
    }

    /// Returns the advisories raised at construction.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Returns the number of parameter channels.
    pub fn num_channels(&self) -> usize {
        self.params.num_channels()
    }

    /// Smallest and largest output of `channel`, or `None` if out of range.
    pub fn output_range(&self, channel: usize) -> Option<(f32, f32)> {
        let kernel = self.model.kernel();
        (channel < kernel.num_channels()).then(|| kernel.output_range(channel))
    }

    /// Returns the configuration map of this quantizer.
    pub fn get_config(&self) -> Map<String, Value> {
        config::to_map(
            self.scheme,
            &self.config,
            &self.params,
            self.cluster_centers.as_deref(),
        )
    }

    // =========================================================================
    // Quantization
    // =========================================================================

    /// Fake-quantizes `tensor`, returning a tensor of the same shape.
    ///
    /// Per-channel quantizers require the configured input rank and a channel
    /// dimension equal to the number of thresholds.
    pub fn quantize(&self, tensor: &Tensor<f32>) -> QuantResult<Tensor<f32>> {
        trace!(scheme = %self.scheme, shape = ?tensor.shape(), "Quantizing tensor");

        if let Some(expected) = self.config.input_rank.filter(|_| self.config.per_channel) {
            if tensor.ndim() != expected {
                return Err(QuantError::RankMismatch {
                    expected,
                    actual: tensor.ndim(),
                });
            }
        }

        quantize_tensor(tensor, self.model.kernel(), self.channel_axis)
    }

    /// Quantizes a collection of named tensors in parallel.
    pub fn quantize_many(
        &self,
        tensors: &[(&str, &Tensor<f32>)],
    ) -> QuantResult<Vec<(String, Tensor<f32>)>> {
        tensors
            .par_iter()
            .map(|(name, tensor)| {
                let quantized = self.quantize(tensor)?;
                Ok((name.to_string(), quantized))
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::distinct_values;

    fn tensor(data: Vec<f32>) -> Tensor<f32> {
        let n = data.len();
        Tensor::from_vec(data, &[n]).unwrap()
    }

    #[test]
    fn test_symmetric_scenario() {
        let q = Quantizer::symmetric(QuantizerConfig::new(3), vec![4.0]).unwrap();
        let out = q.quantize(&tensor(vec![3.4, -5.0])).unwrap();
        assert_eq!(out.to_vec(), vec![3.0, -4.0]);
        assert_eq!(q.output_range(0), Some((-4.0, 3.0)));
        assert_eq!(q.output_range(1), None);
    }

    #[test]
    fn test_power_of_two_rejects_three() {
        let err = Quantizer::power_of_two(QuantizerConfig::default(), vec![3.0]).unwrap_err();
        assert_eq!(err, ConfigError::NotPowerOfTwo { values: vec![3.0] });
        assert!(err.to_string().contains("[3.0]"));
    }

    #[test]
    fn test_uniform_quantizer() {
        let q = Quantizer::uniform(QuantizerConfig::new(2), vec![-10.0], vec![5.0]).unwrap();
        let out = q.quantize(&tensor(vec![-50.0, -3.0, 1.0, 3.0, 50.0])).unwrap();
        assert_eq!(out.to_vec(), vec![-10.0, -5.0, 0.0, 5.0, 5.0]);
    }

    #[test]
    fn test_lut_power_of_two_scenario() {
        let q = Quantizer::lut_power_of_two(QuantizerConfig::new(3), vec![4.0], vec![-25.0, 25.0])
            .unwrap();
        assert!(q.advisories().is_empty());

        let out = q.quantize(&tensor(vec![-7.0, -0.1, 0.0, 0.1, 3.9, 100.0])).unwrap();
        assert_eq!(
            out.to_vec(),
            vec![-0.78125, -0.78125, -0.78125, 0.78125, 0.78125, 0.78125]
        );
    }

    #[test]
    fn test_unsigned_lut() {
        let config = QuantizerConfig::new(3).with_signed(false);
        let q = Quantizer::lut_power_of_two(config, vec![2.0], vec![25.0, 85.0]).unwrap();

        // Inputs are scaled by 2^8 / 2 and clipped to [0, 255]; outputs are c / 128.
        let out = q
            .quantize(&tensor(vec![-1.0, 0.3, 1.0, 5.0, 13.0, 0.6640625]))
            .unwrap();
        assert_eq!(
            out.to_vec(),
            vec![0.1953125, 0.1953125, 0.6640625, 0.6640625, 0.6640625, 0.6640625]
        );
        assert_eq!(q.output_range(0), Some((0.1953125, 0.6640625)));

        let err = Quantizer::lut_symmetric(
            QuantizerConfig::new(2).with_signed(false),
            vec![1.0],
            vec![-1.0],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnsignedClusterCentersNegative { .. }));
    }

    #[test]
    fn test_degenerate_parameters_are_rejected() {
        let err = Quantizer::symmetric(QuantizerConfig::new(0), vec![1.0]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBitWidth { .. }));

        let err = Quantizer::lut_symmetric(
            QuantizerConfig::new(3).with_multiplier_n_bits(0),
            vec![1.0],
            vec![0.0],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBitWidth { .. }));

        assert!(Quantizer::symmetric(QuantizerConfig::new(8), vec![]).is_err());
        assert!(Quantizer::uniform(QuantizerConfig::new(8), vec![], vec![]).is_err());
    }

    #[test]
    fn test_lut_advisory() {
        let config = QuantizerConfig::new(8).with_multiplier_n_bits(8);
        let q = Quantizer::lut_symmetric(config, vec![1.0], vec![0.0]).unwrap();
        assert_eq!(
            q.advisories(),
            &[Advisory::BitWidthEqualsMultiplier { num_bits: 8 }]
        );
    }

    #[test]
    fn test_per_channel_checks() {
        let config = QuantizerConfig::new(4).with_per_channel(-1, 2);
        let q = Quantizer::symmetric(config, vec![1.0, 8.0]).unwrap();

        let input = Tensor::from_vec(vec![0.3, 0.3, 5.1, 5.1], &[2, 2]).unwrap();
        let out = q.quantize(&input).unwrap();
        assert_eq!(out.to_vec(), vec![0.25, 0.0, 0.875, 5.0]);

        let err = q.quantize(&tensor(vec![0.0, 0.0])).unwrap_err();
        assert_eq!(err, QuantError::RankMismatch { expected: 2, actual: 1 });

        let wrong = Tensor::from_vec(vec![0.0; 6], &[2, 3]).unwrap();
        assert!(matches!(
            q.quantize(&wrong),
            Err(QuantError::ChannelMismatch { axis: 1, expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_idempotence() {
        let q = Quantizer::symmetric(QuantizerConfig::new(5), vec![1.7]).unwrap();
        let input = mctq_tensor::linspace(-2.3, 2.3, 201).unwrap();
        let once = q.quantize(&input).unwrap();
        let twice = q.quantize(&once).unwrap();
        assert_eq!(once, twice);
        assert!(distinct_values(once.as_slice()) <= 32);
    }

    #[test]
    fn test_get_config_round_trip() {
        let q = Quantizer::lut_symmetric(
            QuantizerConfig::new(3).with_per_channel(0, 2),
            vec![0.5, 3.0],
            vec![-100.0, -3.0, 0.0, 40.0],
        )
        .unwrap();
        let restored = Quantizer::from_config(q.scheme(), &q.get_config()).unwrap();
        assert_eq!(restored, q);

        let input = Tensor::from_vec(vec![0.1, -0.4, 2.0, -2.5], &[2, 2]).unwrap();
        assert_eq!(
            restored.quantize(&input).unwrap(),
            q.quantize(&input).unwrap()
        );
    }

    #[test]
    fn test_quantize_many() {
        let q = Quantizer::power_of_two(QuantizerConfig::new(8), vec![2.0]).unwrap();
        let a = tensor(vec![0.1, 0.2]);
        let b = tensor(vec![5.0]);
        let out = q.quantize_many(&[("a", &a), ("b", &b)]).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0, "a");
        assert_eq!(out[1].1.to_vec(), vec![2.0 - 2.0 / 128.0]);
    }

    #[test]
    fn test_quantizer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Quantizer>();
    }
}
