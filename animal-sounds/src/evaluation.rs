use tch::nn::ModuleT;

use crate::data::{BatchLoader, SampleSource};
use crate::metrics::{ClassificationReport, ConfusionMatrix};
use crate::utils::to_vec_i64;

/// True and predicted class indices of every evaluated sample.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Predictions {
    pub truth: Vec<i64>,
    pub predicted: Vec<i64>,
}

impl Predictions {
    pub fn len(&self) -> usize {
        self.truth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.truth.is_empty()
    }

    pub fn correct(&self) -> usize {
        self.truth
            .iter()
            .zip(&self.predicted)
            .filter(|(t, p)| t == p)
            .count()
    }

    pub fn accuracy(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.correct() as f64 / self.len() as f64
        }
    }
}

/// Runs the network in inference mode over one full pass of `loader`, without gradients.
pub fn predict<M, S>(net: &M, loader: &mut BatchLoader<'_, S>) -> anyhow::Result<Predictions>
where
    M: ModuleT,
    S: SampleSource,
{
    tch::no_grad(|| {
        let mut predictions = Predictions::default();
        for batch in loader.iter() {
            let (waveforms, labels) = batch?;
            let (batch_size, length) = waveforms.size2()?;
            let logits = net.forward_t(&waveforms.view([batch_size, 1, length]), false);

            predictions.predicted.extend(to_vec_i64(&logits.argmax(-1, false)));
            predictions.truth.extend(to_vec_i64(&labels));
        }
        Ok(predictions)
    })
}

/// Everything reported after scoring a held-out set.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub predictions: Predictions,
    pub matrix: ConfusionMatrix,
    pub report: ClassificationReport,
}

impl Evaluation {
    pub fn new(predictions: Predictions, classes: &[String]) -> anyhow::Result<Self> {
        let matrix =
            ConfusionMatrix::new(&predictions.truth, &predictions.predicted, classes.len())?;
        let report = ClassificationReport::new(&matrix, classes)?;
        Ok(Self {
            predictions,
            matrix,
            report,
        })
    }

    pub fn print(&self) {
        println!(
            "Test accuracy: {:.2}% ({} of {})",
            self.predictions.accuracy() * 100.0,
            self.predictions.correct(),
            self.predictions.len()
        );
        println!();
        println!("Confusion matrix (rows: true, columns: predicted):");
        print!("{}", self.matrix.display(&self.report.classes));
        println!();
        println!("Classification report:");
        print!("{}", self.report);
        println!();

        for (class, name) in self.report.classes.iter().enumerate() {
            let counts = self.matrix.class_counts(class);
            println!(
                "{name}: TP={}, FP={}, FN={}, TN={}",
                counts.tp, counts.fp, counts.fn_, counts.tn
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use tch::{nn, Device};

    use super::*;
    use crate::data::SampleSource;

    /// Sample `i` carries label `i % 3` and a waveform that encodes it at position `i % 3`.
    struct OneHot;

    impl SampleSource for OneHot {
        fn len(&self) -> usize {
            7
        }

        fn get(&self, index: usize) -> anyhow::Result<(Vec<f32>, i64)> {
            let mut waveform = vec![0.0; 3];
            waveform[index % 3] = 1.0;
            Ok((waveform, (index % 3) as i64))
        }
    }

    #[test]
    fn test_predictions_accuracy() {
        let sut = Predictions {
            truth: vec![0, 1, 2, 2],
            predicted: vec![0, 2, 2, 2],
        };
        assert_eq!(3, sut.correct());
        assert_eq!(0.75, sut.accuracy());
        assert_eq!(0.0, Predictions::default().accuracy());
    }

    #[test]
    fn test_predict_uses_argmax() {
        // Identity over the flattened input makes the argmax equal to the label.
        let net = nn::func_t(|xs, _| xs.flatten(1, -1) * 2.0);

        let mut loader = BatchLoader::new(&OneHot, 3).unwrap();
        let sut = predict(&net, &mut loader).unwrap();

        assert_eq!(7, sut.len());
        assert_eq!(sut.truth, sut.predicted);
        assert_eq!(vec![0, 1, 2, 0, 1, 2, 0], sut.truth);
    }

    #[test]
    fn test_predict_does_not_track_gradients() {
        let vs = nn::VarStore::new(Device::Cpu);
        let linear = nn::linear(vs.root(), 3, 3, Default::default());
        let net = nn::func_t(move |xs, _| xs.flatten(1, -1).apply(&linear));

        let mut loader = BatchLoader::new(&OneHot, 4).unwrap();
        predict(&net, &mut loader).unwrap();

        for var in vs.trainable_variables() {
            assert!(!var.grad().defined());
        }
    }

    #[test]
    fn test_evaluation() {
        let predictions = Predictions {
            truth: vec![0, 0, 1, 1],
            predicted: vec![0, 1, 1, 1],
        };
        let classes = vec!["Cat".to_owned(), "Dog".to_owned()];

        let sut = Evaluation::new(predictions, &classes).unwrap();

        assert_eq!(3, sut.matrix.trace());
        assert_eq!(sut.matrix.accuracy(), sut.predictions.accuracy());
        assert_eq!(0.75, sut.report.accuracy);
        sut.print();
    }
}
