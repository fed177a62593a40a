use anyhow::Context;

use super::index::DatasetIndex;
use super::labels::LabelEncoder;
use super::waveform::load_waveform;

/// Random access to `(waveform, label index)` samples.
pub trait SampleSource: Sync {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> anyhow::Result<(Vec<f32>, i64)>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Audio samples backed by an on-disk index.
///
/// Every `get` decodes the file and looks up its label again, nothing is cached.
pub struct AudioDataset {
    index: DatasetIndex,
    encoder: LabelEncoder,
    target_length: usize,
}

impl AudioDataset {
    pub fn new(index: DatasetIndex, encoder: LabelEncoder, target_length: usize) -> Self {
        Self {
            index,
            encoder,
            target_length,
        }
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }
}

impl SampleSource for AudioDataset {
    fn len(&self) -> usize {
        self.index.len()
    }

    fn get(&self, index: usize) -> anyhow::Result<(Vec<f32>, i64)> {
        let (path, label) = self
            .index
            .paths
            .get(index)
            .zip(self.index.labels.get(index))
            .with_context(|| format!("Sample index {index} out of range {}", self.len()))?;

        let label = self
            .encoder
            .encode(label)
            .with_context(|| format!("Labeling {}", path.display()))?;
        let waveform = load_waveform(path, self.target_length)?;

        Ok((waveform, label))
    }
}

/// A view over selected samples of another source.
pub struct Subset<'a, S: SampleSource> {
    source: &'a S,
    indices: Vec<usize>,
}

impl<'a, S: SampleSource> Subset<'a, S> {
    pub fn new(source: &'a S, indices: Vec<usize>) -> anyhow::Result<Self> {
        if let Some(bad) = indices.iter().find(|&&i| i >= source.len()) {
            anyhow::bail!("Subset index {bad} out of range {}", source.len());
        }
        Ok(Self { source, indices })
    }
}

impl<'a, S: SampleSource> SampleSource for Subset<'a, S> {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> anyhow::Result<(Vec<f32>, i64)> {
        let inner = self
            .indices
            .get(index)
            .with_context(|| format!("Subset index {index} out of range {}", self.len()))?;
        self.source.get(*inner)
    }
}
