/// Loss-curve rendering
///
/// Draws the per-epoch mean loss as a PNG line chart. Kept text-free so the
/// renderer has no font dependency on headless machines.
use plotters::prelude::*;
use std::path::Path;

/// Render the loss history as a line plot at `path`
///
/// One point per epoch, in order. An empty history is an error: there is
/// nothing to plot.
pub fn render_loss_curve(losses: &[f32], path: &Path) -> crate::Result<()> {
    if losses.is_empty() {
        return Err(crate::TrainError::Plot(
            "loss history is empty".to_string(),
        ));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let max_loss = losses.iter().copied().fold(f32::MIN, f32::max).max(1e-6);
    let last_epoch = (losses.len() - 1).max(1) as u32;

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| crate::TrainError::Plot(format!("backend error: {e}")))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(0u32..last_epoch, 0f32..max_loss * 1.05)
        .map_err(|e| crate::TrainError::Plot(format!("chart build error: {e}")))?;

    chart
        .draw_series(LineSeries::new(
            losses.iter().enumerate().map(|(i, &l)| (i as u32, l)),
            &BLUE,
        ))
        .map_err(|e| crate::TrainError::Plot(format!("draw error: {e}")))?;

    root.present()
        .map_err(|e| crate::TrainError::Plot(format!("render error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_png() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reports/loss_curve.png");

        render_loss_curve(&[2.3, 1.4, 0.9, 0.7], &path)?;

        let metadata = std::fs::metadata(&path)?;
        assert!(metadata.len() > 0);
        Ok(())
    }

    #[test]
    fn test_single_epoch_history() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("loss_curve.png");
        render_loss_curve(&[1.0], &path)?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_empty_history_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loss_curve.png");
        assert!(render_loss_curve(&[], &path).is_err());
        assert!(!path.exists());
    }
}
