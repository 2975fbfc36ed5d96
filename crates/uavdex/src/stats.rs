//! Regression and comparison statistics over the aircraft collection.
//!
//! An analysis pairs two numeric attributes, filters the collection down to
//! records where both are strictly positive, and fits one of four regression
//! models over the surviving points. Polynomial kinds are plain linear
//! regression over a powers-of-x design matrix.

use serde::Serialize;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::LinearRegression;
use tracing::debug;

use crate::config::StatsConfig;
use crate::error::{Error, Result};
use crate::model::{AircraftModel, NUMERIC_ATTRIBUTES};

/// The regression model families on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// Ordinary least-squares line.
    Linear,
    /// Degree-2 polynomial.
    Poly2,
    /// Degree-3 polynomial.
    Poly3,
    /// Random-forest regressor.
    Forest,
}

impl ModelKind {
    /// Design-matrix degree for the polynomial kinds.
    fn degree(self) -> usize {
        match self {
            Self::Linear => 1,
            Self::Poly2 => 2,
            Self::Poly3 => 3,
            Self::Forest => 0,
        }
    }
}

/// One record surviving the positive-value filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    /// The record's name.
    pub name: String,
    /// The x attribute value.
    pub x: f64,
    /// The y attribute value.
    pub y: f64,
}

/// The fitted model and its goodness-of-fit metrics.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    /// Which model family was fitted.
    pub kind: ModelKind,
    /// The fitted curve sampled over `[min_x, max_x]`.
    pub curve: Vec<(f64, f64)>,
    /// Coefficient of determination over the training points.
    pub r_squared: f64,
    /// Mean squared error over the training points.
    pub mse: f64,
    /// Root mean squared error over the training points.
    pub rmse: f64,
    /// `(slope, intercept)`; present for the linear kind only.
    pub equation: Option<(f64, f64)>,
}

/// The outcome of an analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// The selected x attribute.
    pub x_attr: String,
    /// The selected y attribute.
    pub y_attr: String,
    /// The usable points, in collection order.
    pub points: Vec<Point>,
    /// The fit; `None` when fewer than two points survive the filter.
    pub fit: Option<FitReport>,
}

/// One row of a ratio ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioEntry {
    /// The record's name.
    pub name: String,
    /// The x attribute value.
    pub x: f64,
    /// The y attribute value.
    pub y: f64,
    /// `y / x`.
    pub ratio: f64,
}

/// Fit `kind` over the records' `(x_attr, y_attr)` pairs.
///
/// # Errors
///
/// Returns an unknown-attribute error for an axis outside the schema, a
/// no-usable-data error when every record fails the strictly-positive
/// filter, and a fit error when the solver rejects the data.
pub fn analyze(
    records: &[AircraftModel],
    x_attr: &str,
    y_attr: &str,
    kind: ModelKind,
    options: &StatsConfig,
) -> Result<Analysis> {
    let points = usable_points(records, x_attr, y_attr)?;
    debug!(
        "{} of {} records usable for {x_attr} vs {y_attr}",
        points.len(),
        records.len()
    );

    let fit = if points.len() < 2 {
        None
    } else {
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        Some(fit_model(&xs, &ys, kind, options)?)
    };

    Ok(Analysis {
        x_attr: x_attr.to_string(),
        y_attr: y_attr.to_string(),
        points,
        fit,
    })
}

/// Rank records by `y_attr / x_attr`, descending.
///
/// Uses the same strictly-positive filter as [`analyze`].
///
/// # Errors
///
/// Returns an unknown-attribute error for an axis outside the schema and a
/// no-usable-data error when no record survives the filter.
pub fn ratio_ranking(
    records: &[AircraftModel],
    x_attr: &str,
    y_attr: &str,
) -> Result<Vec<RatioEntry>> {
    let points = usable_points(records, x_attr, y_attr)?;
    let mut entries: Vec<RatioEntry> = points
        .into_iter()
        .map(|p| RatioEntry {
            ratio: p.y / p.x,
            name: p.name,
            x: p.x,
            y: p.y,
        })
        .collect();
    entries.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
    Ok(entries)
}

/// Collect the records where both attributes are strictly positive.
fn usable_points(records: &[AircraftModel], x_attr: &str, y_attr: &str) -> Result<Vec<Point>> {
    check_attribute(records, x_attr)?;
    check_attribute(records, y_attr)?;

    let points: Vec<Point> = records
        .iter()
        .filter_map(|m| {
            let x = m.attribute(x_attr)?;
            let y = m.attribute(y_attr)?;
            (x > 0.0 && y > 0.0 && x.is_finite() && y.is_finite()).then(|| Point {
                name: m.name.clone(),
                x,
                y,
            })
        })
        .collect();

    if points.is_empty() {
        return Err(Error::NoUsableData {
            x: x_attr.to_string(),
            y: y_attr.to_string(),
        });
    }
    Ok(points)
}

/// An attribute is known when it is fixed or any record defines it.
fn check_attribute(records: &[AircraftModel], attr: &str) -> Result<()> {
    let fixed = NUMERIC_ATTRIBUTES.iter().any(|(k, _)| *k == attr);
    let custom = records.iter().any(|m| m.custom_params.contains_key(attr));
    if fixed || custom {
        Ok(())
    } else {
        Err(Error::UnknownAttribute {
            name: attr.to_string(),
        })
    }
}

fn fit_model(xs: &[f64], ys: &[f64], kind: ModelKind, options: &StatsConfig) -> Result<FitReport> {
    let sample_xs = linspace(xs, options.curve_samples);

    let (predicted, curve_ys) = match kind {
        ModelKind::Linear | ModelKind::Poly2 | ModelKind::Poly3 => {
            fit_polynomial(xs, ys, kind.degree(), &sample_xs)?
        }
        ModelKind::Forest => fit_forest(xs, ys, &sample_xs, options)?,
    };

    let equation = match kind {
        ModelKind::Linear => Some(ols_line(xs, ys)),
        _ => None,
    };

    let mse = mean_squared_error(ys, &predicted);
    Ok(FitReport {
        kind,
        curve: sample_xs.into_iter().zip(curve_ys).collect(),
        r_squared: r_squared(ys, &predicted),
        mse,
        rmse: mse.sqrt(),
        equation,
    })
}

/// Fit a degree-k polynomial via linear regression over a powers-of-x design
/// matrix. Returns training predictions and curve samples.
fn fit_polynomial(
    xs: &[f64],
    ys: &[f64],
    degree: usize,
    sample_xs: &[f64],
) -> Result<(Vec<f64>, Vec<f64>)> {
    let train = design_matrix(xs, degree);
    let model = LinearRegression::fit(&train, &ys.to_vec(), Default::default())
        .map_err(|e| Error::fit(e.to_string()))?;

    let predicted = model.predict(&train).map_err(|e| Error::fit(e.to_string()))?;
    let curve = model
        .predict(&design_matrix(sample_xs, degree))
        .map_err(|e| Error::fit(e.to_string()))?;
    Ok((predicted, curve))
}

fn fit_forest(
    xs: &[f64],
    ys: &[f64],
    sample_xs: &[f64],
    options: &StatsConfig,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let train = design_matrix(xs, 1);
    let params = RandomForestRegressorParameters::default()
        .with_n_trees(usize::from(options.forest_trees))
        .with_seed(options.forest_seed);
    let model = RandomForestRegressor::fit(&train, &ys.to_vec(), params)
        .map_err(|e| Error::fit(e.to_string()))?;

    let predicted = model.predict(&train).map_err(|e| Error::fit(e.to_string()))?;
    let curve = model
        .predict(&design_matrix(sample_xs, 1))
        .map_err(|e| Error::fit(e.to_string()))?;
    Ok((predicted, curve))
}

fn design_matrix(xs: &[f64], degree: usize) -> DenseMatrix<f64> {
    let rows: Vec<Vec<f64>> = xs
        .iter()
        .map(|&x| (1..=degree).map(|d| x.powi(d as i32)).collect())
        .collect();
    DenseMatrix::from_2d_vec(&rows)
}

/// Closed-form OLS slope and intercept for the printable equation.
fn ols_line(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let cov: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let var: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if var == 0.0 {
        return (0.0, mean_y);
    }
    let slope = cov / var;
    (slope, mean_y - slope * mean_x)
}

fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len() as f64;
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n
}

fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Evenly spaced samples over the data's `[min, max]` span.
fn linspace(xs: &[f64], samples: usize) -> Vec<f64> {
    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (max - min) / (samples - 1) as f64;
    (0..samples).map(|i| min + step * i as f64).collect()
}
