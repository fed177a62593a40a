use kdam::term::Colorizer;
use tch::Device;

use super::config::EvaluationConfig;
use super::index_non_empty;
use crate::config::CLASS_NAMES;
use crate::data::{AudioDataset, BatchLoader, LabelEncoder};
use crate::evaluation::{predict, Evaluation};
use crate::networks::Network;

pub fn evaluate(config: &EvaluationConfig, device: Device) -> anyhow::Result<Evaluation> {
    let index = index_non_empty(&config.data_directory)?;
    log::info!("Test set size: {}", index.len());

    // The class list is fixed, never taken from the test directory, so indices match training.
    let encoder = LabelEncoder::fit(CLASS_NAMES);
    let classes = encoder.classes().to_vec();

    let network = Network {
        num_classes: encoder.len() as i64,
        ..config.network.clone()
    };

    let (_vs, net) = match network.load(&config.input_weights_filename, device) {
        Ok(loaded) => {
            print!("{}", "\tSuccess ".colorize("bold green"));
            println!(
                "Weights are loaded from {}.",
                config.input_weights_filename.display()
            );
            loaded
        }
        Err(e) => {
            print!("{}", "\tFailure ".colorize("red"));
            println!(
                "Couldn't load weights from {}.",
                config.input_weights_filename.display()
            );
            return Err(e);
        }
    };

    let dataset = AudioDataset::new(index, encoder, network.target_length);
    let mut loader = BatchLoader::new(&dataset, config.batch_size)?.to_device(device);

    let predictions = predict(&net, &mut loader)?;

    Evaluation::new(predictions, &classes)
}
