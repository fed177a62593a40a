use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tch::Device;

use super::config::TrainingConfig;
use super::index_non_empty;
use super::plot::plot_losses;
use crate::config::CLASS_NAMES;
use crate::data::{AudioDataset, BatchLoader, DatasetIndex, LabelEncoder, SampleSource, Subset};
use crate::evaluation::{predict, Predictions};
use crate::networks::{parameter_count, Network};
use crate::training::{fit, TrainingHistory};
use crate::utils::stratified_split;

pub struct TrainingOutcome {
    pub history: TrainingHistory,
    /// `None` when the held-out split came out empty.
    pub held_out: Option<Predictions>,
}

pub fn train(config: &TrainingConfig, device: Device) -> anyhow::Result<TrainingOutcome> {
    let index = index_non_empty(&config.data_directory)?;

    let encoder = LabelEncoder::fit(CLASS_NAMES);
    // Fail before training rather than in the middle of an epoch.
    for (label, path) in index.labels.iter().zip(&index.paths) {
        encoder
            .encode(label)
            .with_context(|| format!("Labeling {}", path.display()))?;
    }

    show_class_statistic(&index);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (train_indices, test_indices) =
        stratified_split(&index.labels, config.test_fraction, &mut rng);

    let target_length = config.network.target_length;
    let dataset = AudioDataset::new(index, encoder, target_length);
    let train_set = Subset::new(&dataset, train_indices)?;
    let test_set = Subset::new(&dataset, test_indices)?;

    log::info!(
        "Train set size: {}, test set size: {}",
        train_set.len(),
        test_set.len()
    );

    let network = Network {
        num_classes: dataset.encoder().len() as i64,
        ..config.network.clone()
    };
    let (vs, net) = network.create(device);
    log::info!("{network}, parameters={}", parameter_count(&vs));

    let mut optimizer = network.create_optimizer(&vs, config.learning_rate)?;

    let mut train_loader = BatchLoader::new(&train_set, config.batch_size)?
        .shuffle(config.seed)
        .to_device(device);

    let history = fit(&net, &mut optimizer, &mut train_loader, config.epochs)?;

    vs.save(&config.output_weights_filename)?;
    log::info!(
        "Weights are saved to {}",
        config.output_weights_filename.display()
    );

    if let Err(e) = plot_losses(&history.losses, &config.plot_filename) {
        log::warn!(
            "Couldn't plot losses to {}: {e}",
            config.plot_filename.display()
        );
    }

    let held_out = if test_set.is_empty() {
        log::warn!("Test set is empty, skipping evaluation");
        None
    } else {
        let mut test_loader = BatchLoader::new(&test_set, config.batch_size)?.to_device(device);
        Some(predict(&net, &mut test_loader)?)
    };

    Ok(TrainingOutcome { history, held_out })
}

fn show_class_statistic(index: &DatasetIndex) {
    let total = index.len();
    for (label, count) in index.class_counts() {
        log::info!(
            "Class {label}: {count}/{:.02}%",
            count as f64 * 100.0 / total as f64
        );
    }
}
