use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tch::{Device, Kind, Tensor};

use super::dataset::SampleSource;
use crate::utils::shuffled_indices;

/// Groups samples of a source into `(waveforms [B, L], labels [B])` tensor batches.
pub struct BatchLoader<'a, S: SampleSource> {
    source: &'a S,
    batch_size: usize,
    shuffle: bool,
    device: Device,
    rng: StdRng,
}

impl<'a, S: SampleSource> BatchLoader<'a, S> {
    pub fn new(source: &'a S, batch_size: usize) -> anyhow::Result<Self> {
        anyhow::ensure!(batch_size > 0, "Batch size must be greater than 0");
        Ok(Self {
            source,
            batch_size,
            shuffle: false,
            device: Device::Cpu,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn shuffle(mut self, seed: Option<u64>) -> Self {
        self.shuffle = true;
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self
    }

    pub fn to_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn len(&self) -> usize {
        (self.source.len() + self.batch_size - 1) / self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// One pass over the source. Reshuffles on every call when shuffling is on.
    pub fn iter(&mut self) -> Batches<'_, S> {
        let order = if self.shuffle {
            shuffled_indices(self.source.len(), &mut self.rng)
        } else {
            (0..self.source.len()).collect()
        };

        Batches {
            source: self.source,
            order,
            position: 0,
            batch_size: self.batch_size,
            device: self.device,
        }
    }
}

pub struct Batches<'a, S: SampleSource> {
    source: &'a S,
    order: Vec<usize>,
    position: usize,
    batch_size: usize,
    device: Device,
}

impl<'a, S: SampleSource> Batches<'a, S> {
    fn load(&self, indices: &[usize]) -> anyhow::Result<(Tensor, Tensor)> {
        let source = self.source;
        let samples = indices
            .par_iter()
            .map(|&i| source.get(i))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let length = samples.first().map_or(0, |(w, _)| w.len());
        anyhow::ensure!(
            samples.iter().all(|(w, _)| w.len() == length),
            "Samples of a batch differ in length"
        );

        let mut flat = Vec::with_capacity(samples.len() * length);
        let mut labels = Vec::with_capacity(samples.len());
        for (waveform, label) in samples {
            flat.extend_from_slice(&waveform);
            labels.push(label);
        }

        let waveforms = Tensor::from_slice(&flat)
            .view([labels.len() as i64, length as i64])
            .to_device(self.device);
        let labels = Tensor::from_slice(&labels)
            .to_kind(Kind::Int64)
            .to_device(self.device);

        Ok((waveforms, labels))
    }
}

impl<'a, S: SampleSource> Iterator for Batches<'a, S> {
    type Item = anyhow::Result<(Tensor, Tensor)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.order.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.order.len());
        let indices = self.order[self.position..end].to_vec();
        self.position = end;
        Some(self.load(&indices))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.order.len() - self.position + self.batch_size - 1) / self.batch_size;
        (left, Some(left))
    }
}

impl<'a, S: SampleSource> ExactSizeIterator for Batches<'a, S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Constant;
    use crate::utils::to_vec_i64;

    #[test]
    fn test_batch_shapes() {
        let source = Constant {
            len: 10,
            length: 6,
            classes: 3,
        };
        let mut sut = BatchLoader::new(&source, 4).unwrap();
        assert_eq!(3, sut.len());

        let batches = sut.iter().collect::<anyhow::Result<Vec<_>>>().unwrap();

        assert_eq!(3, batches.len());
        assert_eq!(vec![4, 6], batches[0].0.size());
        assert_eq!(vec![4], batches[0].1.size());
        assert_eq!(vec![2, 6], batches[2].0.size());
        assert_eq!(Kind::Int64, batches[2].1.kind());

        let labels = to_vec_i64(&batches[0].1);
        assert_eq!(vec![0, 1, 2, 0], labels);
    }

    #[test]
    fn test_shuffle_visits_every_sample_once() {
        let source = Constant {
            len: 23,
            length: 2,
            classes: 23,
        };
        let mut sut = BatchLoader::new(&source, 5).unwrap().shuffle(Some(7));

        let mut seen: Vec<i64> = sut
            .iter()
            .map(|b| to_vec_i64(&b.unwrap().1))
            .flatten()
            .collect();
        seen.sort_unstable();

        assert_eq!((0..23).collect::<Vec<i64>>(), seen);
    }

    #[test]
    fn test_empty_source() {
        let source = Constant {
            len: 0,
            length: 2,
            classes: 1,
        };
        let mut sut = BatchLoader::new(&source, 5).unwrap();
        assert!(sut.is_empty());
        assert_eq!(0, sut.iter().count());
    }

    #[test]
    fn test_zero_batch_size() {
        let source = Constant {
            len: 1,
            length: 1,
            classes: 1,
        };
        assert!(BatchLoader::new(&source, 0).is_err());
    }

    #[test]
    fn test_failing_sample_fails_batch() {
        struct Broken;
        impl SampleSource for Broken {
            fn len(&self) -> usize {
                3
            }
            fn get(&self, index: usize) -> anyhow::Result<(Vec<f32>, i64)> {
                anyhow::ensure!(index != 1, "malformed file");
                Ok((vec![0.0; 4], 0))
            }
        }

        let mut sut = BatchLoader::new(&Broken, 2).unwrap();
        let mut batches = sut.iter();
        assert!(batches.next().unwrap().is_err());
        assert!(batches.next().unwrap().is_ok());
    }
}
