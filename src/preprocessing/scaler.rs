//! Column standardization for distance- and gradient-based estimators

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Per-column z-score scaling fitted on a training matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fit on the columns of `x`; constant columns keep a scale of one
    pub fn fit(x: &Array2<f64>) -> Self {
        let n_features = x.ncols();
        if x.nrows() == 0 {
            return Self {
                mean: Array1::zeros(n_features),
                scale: Array1::ones(n_features),
            };
        }

        let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(n_features));
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 1e-12 { s } else { 1.0 });

        Self { mean, scale }
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let centered = x - &self.mean.view().insert_axis(Axis(0));
        centered / &self.scale.view().insert_axis(Axis(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let x = array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0]];
        let scaler = StandardScaler::fit(&x);
        let z = scaler.transform(&x);

        assert!(z.column(0).sum().abs() < 1e-12);
        assert!(z[[2, 0]] > 1.0);
        // Constant column is centered but not blown up
        assert!(z.column(1).iter().all(|v| v.abs() < 1e-12));
    }
}
