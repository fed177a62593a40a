mod indices;
mod stat;
mod tensor;

pub use indices::{shuffled_indices, stratified_split};
pub use stat::{RunningAverage, Stats};
pub use tensor::to_vec_i64;
