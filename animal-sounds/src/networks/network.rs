use std::fmt::Display;
use std::path::Path;

use anyhow::Context;
use tch::nn::{self, OptimizerConfig, SequentialT};
use tch::Device;

use super::resnet1d::resnet1d;
use crate::config::{CLASS_NAMES, HIDDEN_UNITS, RESIDUAL_BLOCKS, STAGE_WIDTHS, TARGET_LENGTH};

/// Shape of the residual 1-D CNN. Saved weights only load into an identical shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub in_channels: i64,
    pub stage_widths: Vec<i64>,
    pub residual_blocks: usize,
    pub target_length: usize,
    pub hidden_units: i64,
    pub num_classes: i64,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            in_channels: 1,
            stage_widths: STAGE_WIDTHS.to_vec(),
            residual_blocks: RESIDUAL_BLOCKS,
            target_length: TARGET_LENGTH,
            hidden_units: HIDDEN_UNITS,
            num_classes: CLASS_NAMES.len() as i64,
        }
    }
}

impl Network {
    /// Input size of the dense head: every stage halves the length.
    pub fn flatten_size(&self) -> i64 {
        let stages = self.stage_widths.len() as u32;
        let length = self.target_length >> stages;
        self.stage_widths.last().copied().unwrap_or(self.in_channels) * length as i64
    }

    pub fn create_network(&self, path: &nn::Path) -> SequentialT {
        resnet1d(path, self)
    }

    /// Fresh, randomly initialised parameters.
    pub fn create(&self, device: Device) -> (nn::VarStore, SequentialT) {
        let vs = nn::VarStore::new(device);
        let net = self.create_network(&vs.root());
        (vs, net)
    }

    /// Parameters restored from `weight_file`, fails when the file was saved from another shape.
    pub fn load(
        &self,
        weight_file: &Path,
        device: Device,
    ) -> anyhow::Result<(nn::VarStore, SequentialT)> {
        let (mut vs, net) = self.create(device);
        vs.load(weight_file)
            .with_context(|| format!("Loading weights from {}", weight_file.display()))?;
        Ok((vs, net))
    }

    pub fn create_optimizer(
        &self,
        vs: &nn::VarStore,
        learning_rate: f64,
    ) -> anyhow::Result<nn::Optimizer> {
        nn::Adam::default()
            .build(vs, learning_rate)
            .map_err(|e| e.into())
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ResNet1d(widths={:?}, blocks={}, length={}, hidden={}, classes={}, flatten={})",
            self.stage_widths,
            self.residual_blocks,
            self.target_length,
            self.hidden_units,
            self.num_classes,
            self.flatten_size()
        )
    }
}

pub fn parameter_count(vs: &nn::VarStore) -> usize {
    vs.trainable_variables().iter().map(|t| t.numel()).sum()
}

#[cfg(test)]
mod tests {
    use tch::nn::ModuleT;
    use tch::{Kind, Tensor};

    use super::*;

    fn tiny(num_classes: i64) -> Network {
        Network {
            stage_widths: vec![2, 4],
            residual_blocks: 1,
            target_length: 32,
            hidden_units: 8,
            num_classes,
            ..Network::default()
        }
    }

    #[test]
    fn test_flatten_size() {
        assert_eq!(705_536, Network::default().flatten_size());
        assert_eq!(4 * 8, tiny(3).flatten_size());
        let none = Network {
            stage_widths: vec![],
            target_length: 10,
            ..Network::default()
        };
        assert_eq!(10, none.flatten_size());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("weights.ot");

        let network = tiny(3);
        let (vs, net) = network.create(Device::Cpu);
        vs.save(&file).unwrap();

        let (_loaded_vs, loaded) = network.load(&file, Device::Cpu).unwrap();

        let xs = Tensor::randn([2, 1, 32], (Kind::Float, Device::Cpu));
        let expected = net.forward_t(&xs, false);
        let actual = loaded.forward_t(&xs, false);
        assert!(expected.allclose(&actual, 1e-6, 1e-6, false));
    }

    #[test]
    fn test_load_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("weights.ot");

        let (vs, _) = tiny(8).create(Device::Cpu);
        vs.save(&file).unwrap();

        assert!(tiny(3).load(&file, Device::Cpu).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(tiny(3)
            .load(Path::new("/no/such/weights.ot"), Device::Cpu)
            .is_err());
    }

    #[test]
    fn test_parameter_count() {
        let (vs, _) = tiny(3).create(Device::Cpu);
        // conv(w,b) + bn(w,b) per conv_bn; stage0: pre 1->2 k3, res 2x(2->2 k5); stage1: pre 2->4 k3, res 2x(4->4 k5)
        let stage0 = (2 * 3 + 2 + 4) + 2 * (2 * 2 * 5 + 2 + 4);
        let stage1 = (4 * 2 * 3 + 4 + 8) + 2 * (4 * 4 * 5 + 4 + 8);
        let dense = (32 * 8 + 8) + (8 * 3 + 3);
        assert_eq!(stage0 + stage1 + dense, parameter_count(&vs));
    }
}
