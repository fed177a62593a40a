use rand::seq::SliceRandom;
use rand::Rng;

pub fn shuffled_indices<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut indices = (0..len).collect::<Vec<_>>();
    indices.shuffle(rng);
    indices
}

/// Splits indices of `labels` into train and test parts, keeping class proportions.
/// Every class keeps `trunc(n * (1 - test_fraction))` samples for training, the rest goes to test.
/// Both parts are shuffled across classes.
pub fn stratified_split<T, R>(
    labels: &[T],
    test_fraction: f64,
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>)
where
    T: PartialEq,
    R: Rng + ?Sized,
{
    assert!(
        (0.0..1.0).contains(&test_fraction),
        "Test fraction must be in range [0.0, 1.0), given: {test_fraction}."
    );

    // Buckets of indices per distinct label, in order of first appearance.
    let mut buckets: Vec<(&T, Vec<usize>)> = Vec::new();
    for (index, label) in labels.iter().enumerate() {
        match buckets.iter_mut().find(|(l, _)| *l == label) {
            Some((_, bucket)) => bucket.push(index),
            None => buckets.push((label, vec![index])),
        }
    }

    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for (_, mut bucket) in buckets {
        bucket.shuffle(rng);
        let pivot = (bucket.len() as f64 * (1.0 - test_fraction)).trunc() as usize;
        test.extend_from_slice(&bucket[pivot..]);
        bucket.truncate(pivot);
        train.append(&mut bucket);
    }

    train.shuffle(rng);
    test.shuffle(rng);
    (train, test)
}
