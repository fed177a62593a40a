use std::fmt::Display;

/// Square table of counts indexed by `[true class][predicted class]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(truth: &[i64], predicted: &[i64], num_classes: usize) -> anyhow::Result<Self> {
        anyhow::ensure!(
            truth.len() == predicted.len(),
            "Truth and prediction lengths differ: {} != {}",
            truth.len(),
            predicted.len()
        );

        let class_index = |value: i64| -> anyhow::Result<usize> {
            usize::try_from(value)
                .ok()
                .filter(|&v| v < num_classes)
                .ok_or_else(|| anyhow::anyhow!("Class index {value} out of range {num_classes}"))
        };

        let mut counts = vec![vec![0usize; num_classes]; num_classes];
        for (&t, &p) in truth.iter().zip(predicted) {
            counts[class_index(t)?][class_index(p)?] += 1;
        }

        Ok(Self { counts })
    }

    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    pub fn get(&self, truth: usize, predicted: usize) -> usize {
        self.counts[truth][predicted]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn trace(&self) -> usize {
        (0..self.num_classes()).map(|i| self.counts[i][i]).sum()
    }

    /// Samples whose true class is `class`.
    pub fn row_sum(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    /// Samples predicted as `class`.
    pub fn column_sum(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.trace(), self.total())
    }

    pub fn class_counts(&self, class: usize) -> ClassCounts {
        let tp = self.counts[class][class];
        let fp = self.column_sum(class) - tp;
        let fn_ = self.row_sum(class) - tp;
        let tn = self.total() - tp - fp - fn_;
        ClassCounts { tp, fp, fn_, tn }
    }

    /// Renders the matrix with class names as row and column headers.
    pub fn display<'a>(&'a self, classes: &'a [String]) -> impl Display + 'a {
        MatrixTable {
            matrix: self,
            classes,
        }
    }
}

struct MatrixTable<'a> {
    matrix: &'a ConfusionMatrix,
    classes: &'a [String],
}

impl<'a> Display for MatrixTable<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name_width = self.classes.iter().map(String::len).max().unwrap_or(0).max(4);
        let cell_width = name_width.max(self.matrix.total().to_string().len());

        write!(f, "{:<name_width$}", "")?;
        for name in self.classes {
            write!(f, " {name:>cell_width$}")?;
        }
        writeln!(f)?;

        for (row, name) in self.classes.iter().enumerate() {
            write!(f, "{name:<name_width$}")?;
            for col in 0..self.matrix.num_classes() {
                write!(f, " {:>cell_width$}", self.matrix.get(row, col))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One-vs-rest counts of a single class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassCounts {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tn: usize,
}

impl ClassCounts {
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassMetrics {
    fn from_counts(counts: ClassCounts) -> Self {
        let precision = ratio(counts.tp, counts.tp + counts.fp);
        let recall = ratio(counts.tp, counts.tp + counts.fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
            support: counts.tp + counts.fn_,
        }
    }
}

/// Per-class precision, recall, F1 and support, plus accuracy and averages.
/// Undefined ratios (zero denominators) are reported as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<String>,
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn new(matrix: &ConfusionMatrix, classes: &[String]) -> anyhow::Result<Self> {
        anyhow::ensure!(
            classes.len() == matrix.num_classes(),
            "Class names and matrix size differ: {} != {}",
            classes.len(),
            matrix.num_classes()
        );

        let per_class: Vec<ClassMetrics> = (0..matrix.num_classes())
            .map(|c| ClassMetrics::from_counts(matrix.class_counts(c)))
            .collect();

        let total = matrix.total();
        let n = per_class.len().max(1) as f64;
        let mean = |f: fn(&ClassMetrics) -> f64| per_class.iter().map(f).sum::<f64>() / n;
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                per_class
                    .iter()
                    .map(|m| f(m) * m.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        };

        let macro_avg = ClassMetrics {
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1: mean(|m| m.f1),
            support: total,
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        Ok(Self {
            classes: classes.to_vec(),
            per_class,
            accuracy: matrix.accuracy(),
            macro_avg,
            weighted_avg,
        })
    }
}

impl Display for ClassificationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .classes
            .iter()
            .map(String::len)
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or_default();

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        let row = |f: &mut std::fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{name:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.precision, m.recall, m.f1, m.support
            )
        };

        for (name, metrics) in self.classes.iter().zip(&self.per_class) {
            row(f, name, metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    // truth:     0 0 0 1 1 2 2 2 2
    // predicted: 0 0 1 1 2 2 2 2 0
    fn sample() -> ConfusionMatrix {
        ConfusionMatrix::new(
            &[0, 0, 0, 1, 1, 2, 2, 2, 2],
            &[0, 0, 1, 1, 2, 2, 2, 2, 0],
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_matrix_cells() {
        let sut = sample();
        assert_eq!(2, sut.get(0, 0));
        assert_eq!(1, sut.get(0, 1));
        assert_eq!(1, sut.get(1, 2));
        assert_eq!(1, sut.get(2, 0));
        assert_eq!(3, sut.get(2, 2));
    }

    #[test]
    fn test_row_sums_are_support() {
        let sut = sample();
        assert_eq!(vec![3, 2, 4], (0..3).map(|c| sut.row_sum(c)).collect::<Vec<_>>());
        assert_eq!(vec![3, 2, 4], (0..3).map(|c| sut.column_sum(c)).collect::<Vec<_>>());
    }

    #[test]
    fn test_trace_and_accuracy() {
        let sut = sample();
        assert_eq!(6, sut.trace());
        assert_eq!(9, sut.total());
        assert_eq!(6.0 / 9.0, sut.accuracy());
    }

    #[test]
    fn test_class_counts_cover_all_samples() {
        let sut = sample();
        for class in 0..3 {
            assert_eq!(9, sut.class_counts(class).total());
        }
        assert_eq!(
            ClassCounts {
                tp: 2,
                fp: 1,
                fn_: 1,
                tn: 5
            },
            sut.class_counts(0)
        );
        assert_eq!(
            ClassCounts {
                tp: 3,
                fp: 1,
                fn_: 1,
                tn: 4
            },
            sut.class_counts(2)
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(ConfusionMatrix::new(&[0, 1], &[0], 2).is_err());
        assert!(ConfusionMatrix::new(&[0, 2], &[0, 1], 2).is_err());
        assert!(ConfusionMatrix::new(&[-1], &[0], 2).is_err());
    }

    #[test]
    fn test_empty() {
        let sut = ConfusionMatrix::new(&[], &[], 2).unwrap();
        assert_eq!(0, sut.total());
        assert_eq!(0.0, sut.accuracy());

        let report = ClassificationReport::new(&sut, &names(&["a", "b"])).unwrap();
        assert_eq!(0.0, report.weighted_avg.f1);
    }

    #[test]
    fn test_report() {
        let sut = ClassificationReport::new(&sample(), &names(&["Cat", "Cow", "Dog"])).unwrap();

        let cat = &sut.per_class[0];
        assert_eq!(2.0 / 3.0, cat.precision);
        assert_eq!(2.0 / 3.0, cat.recall);
        assert_eq!(3, cat.support);

        let cow = &sut.per_class[1];
        assert_eq!(0.5, cow.precision);
        assert_eq!(0.5, cow.recall);
        assert_eq!(0.5, cow.f1);

        let dog = &sut.per_class[2];
        assert_eq!(0.75, dog.precision);
        assert_eq!(0.75, dog.recall);
        assert_eq!(4, dog.support);

        assert_eq!(6.0 / 9.0, sut.accuracy);
        assert_eq!(9, sut.weighted_avg.support);
        assert!((sut.macro_avg.recall - (2.0 / 3.0 + 0.5 + 0.75) / 3.0).abs() < 1e-12);
        assert!((sut.weighted_avg.recall - 6.0 / 9.0).abs() < 1e-12);

        let text = sut.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("Cow"));
    }

    #[test]
    fn test_class_without_predictions() {
        let matrix = ConfusionMatrix::new(&[0, 1], &[0, 0], 2).unwrap();
        let sut = ClassificationReport::new(&matrix, &names(&["a", "b"])).unwrap();
        assert_eq!(0.0, sut.per_class[1].precision);
        assert_eq!(0.0, sut.per_class[1].f1);
    }

    #[test]
    fn test_matrix_display() {
        let text = sample().display(&names(&["Cat", "Cow", "Dog"])).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(4, lines.len());
        assert!(lines[0].contains("Cat") && lines[0].contains("Dog"));
        assert!(lines[3].starts_with("Dog"));
        assert!(lines[3].trim_end().ends_with('3'));
    }
}
