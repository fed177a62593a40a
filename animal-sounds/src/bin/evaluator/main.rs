use std::path::PathBuf;

use animal_sounds::config::{BATCH_SIZE, TARGET_LENGTH, TEST_DIRECTORY, WEIGHTS_FILENAME};
use animal_sounds::networks::Network;
use animal_sounds::pipeline::{evaluate, EvaluationConfig};
use clap::Parser;

#[derive(Parser)]
#[clap(about = "Scores saved weights against a directory of labeled clips.")]
pub struct Args {
    /// Weight file written by the trainer.
    #[clap(value_parser, short, long, default_value_t = String::from(WEIGHTS_FILENAME))]
    input_weights: String,

    /// Test data directory, one subdirectory of .wav files per class.
    #[clap(short, long, value_parser, value_name = "DATA_DIR", default_value_t = String::from(TEST_DIRECTORY))]
    data: String,

    /// Batch size.
    #[clap(short, long, default_value_t = BATCH_SIZE)]
    batch_size: usize,

    /// Samples per clip after padding or truncation, must match training.
    #[clap(long, default_value_t = TARGET_LENGTH)]
    target_length: usize,

    /// Debug logging.
    #[clap(short, long, default_value_t = false, action)]
    verbose: bool,
}

impl From<&Args> for EvaluationConfig {
    fn from(args: &Args) -> Self {
        Self {
            input_weights_filename: PathBuf::from(&args.input_weights),
            data_directory: PathBuf::from(&args.data),
            batch_size: args.batch_size,
            network: Network {
                target_length: args.target_length,
                ..Network::default()
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    animal_sounds::init_logger(args.verbose)?;

    let device = animal_sounds::configure_device();
    let config = EvaluationConfig::from(&args);
    log::debug!("{config:?}");

    let evaluation = evaluate(&config, device)?;
    evaluation.print();

    Ok(())
}
