//! Cross-validated model comparison over tabular frames

use super::config::SearchConfig;
use super::cross_validation::{CVStrategy, CrossValidator};
use super::engine::{SearchOutcome, TabularSearchEngine, TaskKind, TrainedModel};
use super::estimator::{Estimator, FitParams, FittedModel};
use super::leaderboard::{Leaderboard, LeaderboardEntry};
use super::models::ModelMetrics;
use crate::error::{MivError, Result};
use crate::explainability::{FeatureImportancePlot, FEATURE_IMPORTANCE_PLOT};
use crate::preprocessing::{numeric_target, FeatureEncoder, LabelEncoder};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Prediction column added by [`AutoSearchEngine::predict`]
pub const PREDICTION_LABEL: &str = "prediction_label";
/// Winning-class probability column for classifiers
pub const PREDICTION_SCORE: &str = "prediction_score";

/// Everything needed to score new rows with a selected model
#[derive(Debug, Clone)]
pub struct SearchArtifact {
    pub target: String,
    pub encoder: FeatureEncoder,
    pub labels: Option<LabelEncoder>,
    pub model: FittedModel,
}

/// Encoded training data for one search
struct Prepared {
    x: Array2<f64>,
    y: Array1<f64>,
    encoder: FeatureEncoder,
    labels: Option<LabelEncoder>,
}

/// In-process search engine evaluating the configured candidate estimators
#[derive(Debug, Clone, Default)]
pub struct AutoSearchEngine {
    config: SearchConfig,
}

impl AutoSearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn prepare(&self, data: &DataFrame, target: &str, task: TaskKind) -> Result<Prepared> {
        let target_col = data
            .column(target)
            .map_err(|_| MivError::ColumnNotFound(target.to_string()))?;
        let mask = target_col.as_materialized_series().is_not_null();
        let frame = data.filter(&mask)?;

        if frame.height() < 2 {
            return Err(MivError::ValidationError(format!(
                "need at least 2 rows with a value in '{}', found {}",
                target,
                frame.height()
            )));
        }

        let encoder = FeatureEncoder::fit(&frame, target)?;
        if encoder.n_features() == 0 {
            return Err(MivError::ValidationError(
                "dataset has no feature columns besides the target".to_string(),
            ));
        }
        let x = encoder.transform(&frame)?;

        let series = frame.column(target)?.as_materialized_series();
        let (y, labels) = match task {
            TaskKind::Classification => {
                let labels = LabelEncoder::fit(series)?;
                (labels.transform(series)?, Some(labels))
            }
            TaskKind::Regression => (numeric_target(series)?, None),
        };

        Ok(Prepared { x, y, encoder, labels })
    }

    fn cv_strategy(&self, task: TaskKind, y: &Array1<f64>) -> CVStrategy {
        let n = y.len();
        match task {
            TaskKind::Classification => {
                let mut counts: HashMap<i64, usize> = HashMap::new();
                for &v in y.iter() {
                    *counts.entry(v as i64).or_default() += 1;
                }
                let smallest = counts.values().copied().min().unwrap_or(n);
                let n_splits = self.config.folds.min(smallest).min(n).max(2);
                CVStrategy::StratifiedKFold { n_splits }
            }
            TaskKind::Regression => CVStrategy::KFold {
                n_splits: self.config.folds.min(n).max(2),
            },
        }
    }

    fn fit_params(&self, prepared: &Prepared, seed: u64) -> FitParams {
        FitParams {
            n_classes: prepared.labels.as_ref().map_or(0, |l| l.n_classes()),
            seed,
            n_estimators: self.config.n_estimators,
            n_neighbors: self.config.n_neighbors,
            ridge_alpha: self.config.ridge_alpha,
        }
    }

    fn evaluate(
        &self,
        estimator: Estimator,
        task: TaskKind,
        prepared: &Prepared,
        strategy: CVStrategy,
        params: &FitParams,
    ) -> Result<ModelMetrics> {
        let splits = CrossValidator::new(strategy, params.seed).split(&prepared.y)?;
        let mut fold_metrics = Vec::with_capacity(splits.len());

        for split in &splits {
            let x_train = prepared.x.select(Axis(0), &split.train_indices);
            let y_train = prepared.y.select(Axis(0), &split.train_indices);
            let x_test = prepared.x.select(Axis(0), &split.test_indices);
            let y_test = prepared.y.select(Axis(0), &split.test_indices);

            let start = Instant::now();
            let model = estimator.fit(task, &x_train, &y_train, params)?;
            let elapsed = start.elapsed().as_secs_f64();

            let y_pred = model.predict(&x_test)?;
            let mut metrics = match task {
                TaskKind::Classification => {
                    ModelMetrics::compute_classification(&y_test, &y_pred, params.n_classes)
                }
                TaskKind::Regression => ModelMetrics::compute_regression(&y_test, &y_pred),
            };
            metrics.training_time_secs = elapsed;
            fold_metrics.push(metrics);
        }

        Ok(ModelMetrics::mean_of(&fold_metrics))
    }

    fn artifact<'a>(&self, model: &'a TrainedModel) -> Result<&'a SearchArtifact> {
        model.downcast_ref::<SearchArtifact>().ok_or_else(|| {
            MivError::ValidationError(format!(
                "model '{}' was not produced by this search engine",
                model.name()
            ))
        })
    }
}

impl TabularSearchEngine for AutoSearchEngine {
    fn compare_models(
        &self,
        data: &DataFrame,
        target: &str,
        task: TaskKind,
        seed: u64,
    ) -> Result<SearchOutcome> {
        let prepared = self.prepare(data, target, task)?;
        let strategy = self.cv_strategy(task, &prepared.y);
        let params = self.fit_params(&prepared, seed);
        let candidates = self.config.candidates_for(task);

        info!(
            target_column = %target,
            task = %task,
            rows = prepared.x.nrows(),
            features = prepared.x.ncols(),
            candidates = candidates.len(),
            "Comparing models"
        );

        let mut entries = Vec::with_capacity(candidates.len());
        for estimator in candidates {
            let name = estimator.display_name(task);
            match self.evaluate(estimator, task, &prepared, strategy, &params) {
                Ok(metrics) => {
                    debug!(model = name, score = ?self.config.sort_metric(task).value(&metrics), "Candidate evaluated");
                    entries.push(LeaderboardEntry {
                        model: name.to_string(),
                        estimator,
                        metrics,
                    });
                }
                Err(e) => warn!(model = name, error = %e, "Candidate failed, leaving it off the leaderboard"),
            }
        }

        let leaderboard = Leaderboard::new(task, self.config.sort_metric(task), entries);
        let best = leaderboard.best().ok_or_else(|| {
            MivError::ModelSearchFailure("no candidate model could be trained".to_string())
        })?;

        let fitted = best.estimator.fit(task, &prepared.x, &prepared.y, &params)?;
        let description = serde_json::json!({
            "model": best.model,
            "params": fitted.params(),
            "features": prepared.encoder.feature_names(),
        });
        info!(model = %best.model, "Best model selected");

        let model = TrainedModel::new(
            task,
            best.model.clone(),
            description,
            SearchArtifact {
                target: target.to_string(),
                encoder: prepared.encoder,
                labels: prepared.labels,
                model: fitted,
            },
        );

        Ok(SearchOutcome { model, leaderboard })
    }

    fn plot_feature_importance(&self, model: &TrainedModel) -> Result<FeatureImportancePlot> {
        let artifact = self.artifact(model)?;
        let importances = artifact.model.feature_importances().ok_or_else(|| {
            MivError::UnsupportedPlot {
                plot: FEATURE_IMPORTANCE_PLOT.to_string(),
                model: model.name().to_string(),
            }
        })?;

        Ok(FeatureImportancePlot::new(
            &artifact.encoder.feature_names(),
            &importances.to_vec(),
        ))
    }

    fn predict(&self, model: &TrainedModel, data: &DataFrame) -> Result<DataFrame> {
        let artifact = self.artifact(model)?;
        let x = artifact.encoder.transform(data)?;
        let codes = artifact.model.predict(&x)?;

        let mut out = data.clone();
        match (&artifact.labels, model.task()) {
            (Some(labels), TaskKind::Classification) => {
                let predicted: Vec<&str> = codes.iter().map(|&c| labels.inverse(c)).collect();
                let scores: Vec<Option<f64>> = match artifact.model.predict_proba(&x)? {
                    Some(proba) => proba
                        .rows()
                        .into_iter()
                        .map(|row| Some((row.iter().fold(0.0f64, |m, &p| m.max(p)) * 10_000.0).round() / 10_000.0))
                        .collect(),
                    None => vec![None; codes.len()],
                };
                out.with_column(Series::new(PREDICTION_LABEL.into(), predicted))?;
                out.with_column(Series::new(PREDICTION_SCORE.into(), scores))?;
            }
            _ => {
                out.with_column(Series::new(PREDICTION_LABEL.into(), codes.to_vec()))?;
            }
        }
        Ok(out)
    }
}
