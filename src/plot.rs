use ndarray::Array2;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("projection has {got} columns, expected {want}")]
    WrongShape { got: usize, want: usize },
    #[error("render failed: {0}")]
    Render(String),
}

// Same styling as the upstream plots: tiny markers, low opacity so dense
// regions read as brightness, dark background.
const MARKER_SIZE: i32 = 2;
const MARKER_ALPHA: f64 = 0.1;
const MARKER_COLOR: RGBColor = RGBColor(99, 110, 250);

fn axis_range(vals: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in vals {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1e-6);
    (lo - pad, hi + pad)
}

/// Scatter plot of a 2-component projection.
pub fn scatter_2d(projected: &Array2<f64>, path: &Path) -> Result<(), PlotError> {
    if projected.ncols() != 2 {
        return Err(PlotError::WrongShape {
            got: projected.ncols(),
            want: 2,
        });
    }
    let (x_lo, x_hi) = axis_range(projected.column(0).iter().copied());
    let (y_lo, y_hi) = axis_range(projected.column(1).iter().copied());

    let root = SVGBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&BLACK).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "2D PCA Projection of Log Sequence Vectors",
            ("sans-serif", 24).into_font().color(&WHITE),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .axis_style(WHITE.mix(0.6))
        .label_style(("sans-serif", 14).into_font().color(&WHITE))
        .x_desc("Principal Component 1")
        .y_desc("Principal Component 2")
        .draw()
        .map_err(render_err)?;
    chart
        .draw_series(projected.rows().into_iter().map(|row| {
            Circle::new(
                (row[0], row[1]),
                MARKER_SIZE,
                MARKER_COLOR.mix(MARKER_ALPHA).filled(),
            )
        }))
        .map_err(render_err)?;
    root.present().map_err(render_err)?;
    info!(points = projected.nrows(), path = %path.display(), "2d scatter written");
    Ok(())
}

/// Scatter plot of a 3-component projection.
pub fn scatter_3d(projected: &Array2<f64>, path: &Path) -> Result<(), PlotError> {
    if projected.ncols() != 3 {
        return Err(PlotError::WrongShape {
            got: projected.ncols(),
            want: 3,
        });
    }
    let (x_lo, x_hi) = axis_range(projected.column(0).iter().copied());
    let (y_lo, y_hi) = axis_range(projected.column(1).iter().copied());
    let (z_lo, z_hi) = axis_range(projected.column(2).iter().copied());

    let root = SVGBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&BLACK).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "3D PCA Projection of Log Sequence Vectors",
            ("sans-serif", 24).into_font().color(&WHITE),
        )
        .margin(20)
        .build_cartesian_3d(x_lo..x_hi, y_lo..y_hi, z_lo..z_hi)
        .map_err(render_err)?;
    chart
        .configure_axes()
        .label_style(("sans-serif", 12).into_font().color(&WHITE))
        .axis_panel_style(WHITE.mix(0.05))
        .draw()
        .map_err(render_err)?;
    chart
        .draw_series(projected.rows().into_iter().map(|row| {
            Circle::new(
                (row[0], row[1], row[2]),
                MARKER_SIZE,
                MARKER_COLOR.mix(MARKER_ALPHA).filled(),
            )
        }))
        .map_err(render_err)?;
    root.present().map_err(render_err)?;
    info!(points = projected.nrows(), path = %path.display(), "3d scatter written");
    Ok(())
}

fn render_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}
