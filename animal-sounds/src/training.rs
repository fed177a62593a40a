use std::time::Instant;

use anyhow::Context;
use kdam::{tqdm, BarExt};
use tch::nn::{ModuleT, Optimizer};

use crate::data::{BatchLoader, SampleSource};
use crate::utils::{RunningAverage, Stats};

/// Per-epoch mean losses and epoch durations of a finished run.
#[derive(Debug, Clone)]
pub struct TrainingHistory {
    pub losses: Vec<f64>,
    pub timings: Stats,
}

/// One full pass over `loader`, returns the mean batch loss.
pub fn train_epoch<M, S>(
    net: &M,
    optimizer: &mut Optimizer,
    loader: &mut BatchLoader<'_, S>,
) -> anyhow::Result<f64>
where
    M: ModuleT,
    S: SampleSource,
{
    let mut loss_avg = RunningAverage::new();

    for batch in loader.iter() {
        let (waveforms, labels) = batch?;
        let (batch_size, length) = waveforms.size2()?;

        let loss = net
            .forward_t(&waveforms.view([batch_size, 1, length]), true)
            .cross_entropy_for_logits(&labels);
        optimizer.backward_step(&loss);

        let loss = loss.double_value(&[]);
        if !loss.is_finite() {
            log::warn!("Non finite batch loss: {loss}");
        }
        loss_avg.push(loss);
    }

    loss_avg.mean().context("Epoch has no batches")
}

/// Trains for exactly `epochs` epochs. No early stopping, the learning rate never changes.
pub fn fit<M, S>(
    net: &M,
    optimizer: &mut Optimizer,
    loader: &mut BatchLoader<'_, S>,
    epochs: usize,
) -> anyhow::Result<TrainingHistory>
where
    M: ModuleT,
    S: SampleSource,
{
    let mut losses = Vec::with_capacity(epochs);
    let mut timings = Stats::new();

    let mut epoch_pb = tqdm!(
        total = epochs,
        desc = "Training",
        unit = "epoch",
        force_refresh = true,
        position = 0
    );

    for epoch in 1..=epochs {
        let timer = Instant::now();

        let loss = train_epoch(net, optimizer, loader)
            .with_context(|| format!("Training epoch {epoch}"))?;

        let elapsed = timer.elapsed().as_secs_f64();
        timings.push(elapsed);
        losses.push(loss);

        log::debug!("Epoch {epoch} finished in {elapsed:.2}s");
        epoch_pb.write(format!("Epoch {epoch:>3}/{epochs}: loss={loss:.6}"));
        epoch_pb.update(1);
    }

    Ok(TrainingHistory { losses, timings })
}
