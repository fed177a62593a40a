pub mod config;
pub mod data;
pub mod evaluation;
pub mod metrics;
pub mod networks;
pub mod pipeline;
pub mod training;
pub mod utils;

/// Limits libtorch to the CPUs of this machine and logs the device the run is pinned to.
pub fn configure_device() -> tch::Device {
    tch::set_num_threads(num_cpus::get() as i32);

    let device = tch::Device::cuda_if_available();
    if tch::Cuda::is_available() {
        log::info!("Found CUDA device");
        tch::Cuda::cudnn_set_benchmark(true);
    } else {
        log::info!("Running on CPU, threads={}", num_cpus::get());
    }
    device
}

pub fn init_logger(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_rfc3339()
            .add_filter_allow_str("animal_sounds")
            .add_filter_allow_str("trainer")
            .add_filter_allow_str("evaluator")
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}
