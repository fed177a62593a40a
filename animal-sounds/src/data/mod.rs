mod dataset;
mod index;
mod labels;
mod loader;
mod waveform;

pub use dataset::{AudioDataset, SampleSource, Subset};
pub use index::{index_directory, DatasetIndex};
pub use labels::LabelEncoder;
pub use loader::{BatchLoader, Batches};
pub use waveform::{fix_length, load_waveform};

#[cfg(test)]
pub(crate) use dataset::tests::Constant;
#[cfg(test)]
pub(crate) use waveform::tests::write_wav;
