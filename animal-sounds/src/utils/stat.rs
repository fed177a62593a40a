/// Accumulates a sum and a count, for per-epoch mean loss.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunningAverage {
    sum: f64,
    count: usize,
}

impl RunningAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Min / max / last / mean over a series, e.g. epoch durations.
#[derive(Debug, Clone)]
pub struct Stats {
    min: f64,
    max: f64,
    last: f64,
    average: RunningAverage,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            min: f64::MAX,
            max: f64::MIN,
            last: f64::NAN,
            average: RunningAverage::new(),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.last = value;
        self.average.push(value);
    }

    fn non_empty(&self, value: f64) -> Option<f64> {
        (self.average.count() > 0).then_some(value)
    }

    pub fn min(&self) -> Option<f64> {
        self.non_empty(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        self.non_empty(self.max)
    }

    pub fn last(&self) -> Option<f64> {
        self.non_empty(self.last)
    }

    pub fn mean(&self) -> Option<f64> {
        self.average.mean()
    }

    pub fn sum(&self) -> Option<f64> {
        self.non_empty(self.average.sum)
    }

    pub fn count(&self) -> usize {
        self.average.count()
    }
}

impl FromIterator<f64> for Stats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Stats::new();
        iter.into_iter().for_each(|v| stats.push(v));
        stats
    }
}
