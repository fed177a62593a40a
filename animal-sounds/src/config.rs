pub const SAMPLE_RATE: u32 = 22050;

// One second at the source sample rate.
pub const TARGET_LENGTH: usize = 22050;

pub const AUDIO_EXTENSION: &str = ".wav";

/// Closed set of species. Trainer and evaluator must share it, otherwise indices map to wrong names.
pub const CLASS_NAMES: [&str; 8] = [
    "Bear", "Cat", "Chicken", "Cow", "Dog", "Dolphin", "Donkey", "Elephant",
];

pub const STAGE_WIDTHS: [i64; 4] = [64, 128, 256, 512];
pub const RESIDUAL_BLOCKS: usize = 2;
pub const HIDDEN_UNITS: i64 = 128;

pub const BATCH_SIZE: usize = 16;
pub const EPOCHS: usize = 100;
pub const LEARNING_RATE: f64 = 5e-5;

pub const TRAIN_DIRECTORY: &str = "./data/train/";
pub const TEST_DIRECTORY: &str = "./data/test/";
pub const WEIGHTS_FILENAME: &str = "model.resnet1d.ot";
pub const LOSS_PLOT_FILENAME: &str = "loss.svg";
