use std::path::PathBuf;

use crate::networks::Network;

#[derive(Debug)]
pub struct TrainingConfig {
    pub data_directory: PathBuf,
    pub output_weights_filename: PathBuf,
    pub plot_filename: PathBuf,
    pub test_fraction: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Shape to train; the class count always comes from the label encoder.
    pub network: Network,
    pub seed: Option<u64>,
}

#[derive(Debug)]
pub struct EvaluationConfig {
    pub input_weights_filename: PathBuf,
    pub data_directory: PathBuf,
    pub batch_size: usize,
    /// Must match the shape the weights were saved from.
    pub network: Network,
}
