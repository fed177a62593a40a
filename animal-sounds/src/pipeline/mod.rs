//! End-to-end runs behind the `trainer` and `evaluator` binaries.

mod config;
mod evaluate;
mod plot;
mod train;

pub use config::{EvaluationConfig, TrainingConfig};
pub use evaluate::evaluate;
pub use plot::plot_losses;
pub use train::{train, TrainingOutcome};

use crate::config::AUDIO_EXTENSION;
use crate::data::{index_directory, DatasetIndex};

/// Index of `directory`, refusing a directory with no clips in it.
fn index_non_empty(directory: &std::path::Path) -> anyhow::Result<DatasetIndex> {
    let index = index_directory(directory, AUDIO_EXTENSION)?;
    anyhow::ensure!(
        !index.is_empty(),
        "No {AUDIO_EXTENSION} files found in {}",
        directory.display()
    );
    Ok(index)
}
