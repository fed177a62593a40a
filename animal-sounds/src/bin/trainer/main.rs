use std::path::PathBuf;

use animal_sounds::config::{
    BATCH_SIZE, EPOCHS, LEARNING_RATE, LOSS_PLOT_FILENAME, TARGET_LENGTH, TRAIN_DIRECTORY,
    WEIGHTS_FILENAME,
};
use animal_sounds::networks::Network;
use animal_sounds::pipeline::{train, TrainingConfig};
use clap::Parser;

#[derive(Parser)]
#[clap(about = "Trains the species classifier on a directory of labeled clips.")]
pub struct Args {
    /// Data directory, one subdirectory of .wav files per class.
    #[clap(short, long, value_parser, value_name = "DATA_DIR", default_value_t = String::from(TRAIN_DIRECTORY))]
    data: String,

    /// Output weight file.
    #[clap(value_parser, short, long, default_value_t = String::from(WEIGHTS_FILENAME))]
    output_weights: String,

    /// Loss plot file (SVG).
    #[clap(value_parser, long, default_value_t = String::from(LOSS_PLOT_FILENAME))]
    plot: String,

    /// Held-out fraction, in percents (0..50).
    #[clap(short, long, default_value_t = 20, value_parser = clap::value_parser!(u8).range(0..50))]
    test_fraction: u8,

    /// Number of epochs.
    #[clap(short, long, default_value_t = EPOCHS)]
    epochs: usize,

    /// Batch size.
    #[clap(short, long, default_value_t = BATCH_SIZE)]
    batch_size: usize,

    /// Adam learning rate.
    #[clap(short, long, default_value_t = LEARNING_RATE)]
    learning_rate: f64,

    /// Samples per clip after padding or truncation.
    #[clap(long, default_value_t = TARGET_LENGTH)]
    target_length: usize,

    /// Seed for the train/test split and batch shuffling.
    #[clap(long)]
    seed: Option<u64>,

    /// Debug logging.
    #[clap(short, long, default_value_t = false, action)]
    verbose: bool,
}

impl From<&Args> for TrainingConfig {
    fn from(args: &Args) -> Self {
        Self {
            data_directory: PathBuf::from(&args.data),
            output_weights_filename: PathBuf::from(&args.output_weights),
            plot_filename: PathBuf::from(&args.plot),
            test_fraction: f64::from(args.test_fraction) / 100.0,
            epochs: args.epochs,
            batch_size: args.batch_size,
            learning_rate: args.learning_rate,
            network: Network {
                target_length: args.target_length,
                ..Network::default()
            },
            seed: args.seed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    animal_sounds::init_logger(args.verbose)?;

    let device = animal_sounds::configure_device();
    let config = TrainingConfig::from(&args);
    log::debug!("{config:?}");

    let outcome = train(&config, device)?;
    let history = outcome.history;

    if let Some(predictions) = outcome.held_out {
        println!(
            "Test accuracy: {:.2}% ({} of {})",
            predictions.accuracy() * 100.0,
            predictions.correct(),
            predictions.len()
        );
    }

    let loss = |i: Option<&f64>| i.copied().unwrap_or_default();
    println!(
        "Loss: first/last={:.6}/{:.6}",
        loss(history.losses.first()),
        loss(history.losses.last())
    );

    println!(
        "Elapsed: {:.02}s. Epoch time: min/max/avg={:0.2}s/{:.02}s/{:.02}s",
        history.timings.sum().unwrap_or_default(),
        history.timings.min().unwrap_or_default(),
        history.timings.max().unwrap_or_default(),
        history.timings.mean().unwrap_or_default()
    );

    Ok(())
}
