//! Diagnostic plots rendered to SVG with plotters
//!
//! `plot_*` functions render a standalone [`Figure`]. `draw_*` functions
//! draw into a caller-supplied drawing area so a plot can share a canvas
//! with others (e.g. one panel of a `split_evenly` grid).

use crate::error::{ReportError, Result};
use crate::metrics::{roc_curve, RocCurve};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fmt::Display;
use std::path::Path;

/// Default figure size in pixels
pub const DEFAULT_FIGSIZE: (u32, u32) = (500, 500);

fn plot_err(e: impl Display) -> ReportError {
    ReportError::PlotError(e.to_string())
}

/// A rendered SVG figure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    svg: String,
    width: u32,
    height: u32,
}

impl Figure {
    /// Render a figure by drawing onto a fresh white SVG canvas
    pub fn render<F>(figsize: (u32, u32), draw: F) -> Result<Self>
    where
        F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<()>,
    {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, figsize).into_drawing_area();
            root.fill(&WHITE).map_err(plot_err)?;
            draw(&root)?;
            root.present().map_err(plot_err)?;
        }

        Ok(Self {
            svg,
            width: figsize.0,
            height: figsize.1,
        })
    }

    pub fn as_svg(&self) -> &str {
        &self.svg
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Write the SVG document to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.svg)?;
        Ok(())
    }
}

/// ROC curve of positive-class scores against 0/1 truths
pub fn plot_roc_curve(scores: &[f64], truths: &[f64], figsize: (u32, u32)) -> Result<Figure> {
    Figure::render(figsize, |area| draw_roc_curve(area, scores, truths).map(|_| ()))
}

/// Draw the ROC curve and chance diagonal, returning the computed curve
pub fn draw_roc_curve<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    scores: &[f64],
    truths: &[f64],
) -> Result<RocCurve> {
    let roc = roc_curve(scores, truths)?;
    let auc = roc.auc();

    let mut chart = ChartBuilder::on(area)
        .caption(format!("ROC Curve | AUC = {:.3}", auc), ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..1f64, 0f64..1f64)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            roc.fpr.iter().copied().zip(roc.tpr.iter().copied()),
            &BLACK,
        ))
        .map_err(plot_err)?;
    chart
        .draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], &RED.mix(0.6)))
        .map_err(plot_err)?;

    Ok(roc)
}

/// Scatter of observed values (y-axis) against predictions (x-axis)
pub fn plot_obs_vs_pred(y_pred: &[f64], y_true: &[f64], figsize: (u32, u32)) -> Result<Figure> {
    Figure::render(figsize, |area| draw_obs_vs_pred(area, y_pred, y_true))
}

pub fn draw_obs_vs_pred<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    y_pred: &[f64],
    y_true: &[f64],
) -> Result<()> {
    let points: Vec<(f64, f64)> = y_pred.iter().copied().zip(y_true.iter().copied()).collect();
    draw_identity_scatter(area, &points, "Predicted", "Observed", "Observed vs Predicted")
}

/// Scatter of predictions (y-axis) against true values (x-axis) with a
/// caption naming the target and the Pearson correlation
pub fn plot_pred_vs_true(
    y_pred: &[f64],
    y_true: &[f64],
    caption: &str,
    figsize: (u32, u32),
) -> Result<Figure> {
    let points: Vec<(f64, f64)> = y_true.iter().copied().zip(y_pred.iter().copied()).collect();
    Figure::render(figsize, |area| {
        draw_identity_scatter(area, &points, "True Values", "Predicted Values", caption)
    })
}

fn draw_identity_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    points: &[(f64, f64)],
    x_desc: &str,
    y_desc: &str,
    caption: &str,
) -> Result<()> {
    if points.is_empty() {
        return Err(ReportError::PlotError("no points to plot".to_string()));
    }

    let (lo, hi) = points
        .iter()
        .flat_map(|&(x, y)| [x, y])
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return Err(ReportError::PlotError("no finite points to plot".to_string()));
    }
    let pad = ((hi - lo) * 0.05).max(1e-9);
    let range = (lo - pad)..(hi + pad);

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(range.clone(), range)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, 2, BLACK.filled())))
        .map_err(plot_err)?;
    chart
        .draw_series(LineSeries::new(vec![(lo, lo), (hi, hi)], &RED))
        .map_err(plot_err)?;

    Ok(())
}
