use tch::{Device, Kind, Tensor};

/// Copies a 1-D integer tensor to the host.
pub fn to_vec_i64(t: &Tensor) -> Vec<i64> {
    let t = t.to_device(Device::Cpu).to_kind(Kind::Int64).flatten(0, -1);
    let numel = t.numel();
    let mut values = vec![0i64; numel];
    t.copy_data(&mut values, numel);
    values
}
