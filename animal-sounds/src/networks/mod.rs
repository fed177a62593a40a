mod network;
mod resnet1d;

pub use network::{parameter_count, Network};
