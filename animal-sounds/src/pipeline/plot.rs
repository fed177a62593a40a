use std::path::Path;

#[cfg(feature = "plot")]
pub fn plot_losses(losses: &[f64], path: &Path) -> anyhow::Result<()> {
    use plotters::prelude::{ChartBuilder, IntoDrawingArea, LineSeries, SVGBackend, RED, WHITE};

    let points: Vec<(usize, f64)> = losses
        .iter()
        .enumerate()
        .filter(|(_, loss)| loss.is_finite())
        .map(|(epoch, &loss)| (epoch + 1, loss))
        .collect();

    let max_loss = points.iter().map(|(_, l)| *l).fold(f64::EPSILON, f64::max);

    let root = SVGBackend::new(path, (800, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Training loss", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(1usize..losses.len().max(2), 0f64..max_loss * 1.05)?;

    chart
        .configure_mesh()
        .x_desc("Epoch")
        .y_desc("Mean loss")
        .draw()?;

    chart.draw_series(LineSeries::new(points, &RED))?;
    root.present()?;

    log::info!("Loss plot saved to {}", path.display());
    Ok(())
}

#[cfg(not(feature = "plot"))]
pub fn plot_losses(_: &[f64], _: &Path) -> anyhow::Result<()> {
    Ok(())
}
