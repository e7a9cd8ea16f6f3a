use nalgebra::{DMatrix, DVector};

use crate::error::TreeError;

/// 2x2 matrix with true labels as rows and predicted labels as columns.
pub type ConfusionMatrix = DMatrix<usize>;

pub trait ClassificationMetrics {
    /// Computes the confusion matrix based on the true labels and predicted labels.
    ///
    /// # Arguments
    ///
    /// * `y_true` - The true labels.
    /// * `y_pred` - The predicted labels.
    ///
    /// # Returns
    ///
    /// The confusion matrix, or an error if the vectors differ in length or
    /// hold a label other than 0 or 1.
    fn confusion_matrix(
        &self,
        y_true: &DVector<u8>,
        y_pred: &DVector<u8>,
    ) -> Result<ConfusionMatrix, TreeError> {
        if y_true.len() != y_pred.len() {
            return Err(TreeError::PredictionLengthMismatch {
                predictions: y_pred.len(),
                labels: y_true.len(),
            });
        }

        let mut matrix = ConfusionMatrix::zeros(2, 2);
        for (index, (&y_t, &y_p)) in y_true.iter().zip(y_pred.iter()).enumerate() {
            if let Some(label) = [y_t, y_p].into_iter().find(|&label| label > 1) {
                return Err(TreeError::InvalidLabel { index, label });
            }
            matrix[(usize::from(y_t), usize::from(y_p))] += 1;
        }

        Ok(matrix)
    }

    /// Computes the accuracy based on the true labels and predicted labels.
    ///
    /// # Arguments
    ///
    /// * `y_true` - The true labels.
    /// * `y_pred` - The predicted labels.
    ///
    /// # Returns
    ///
    /// The accuracy as a `Result` containing a `f64` value or an error.
    fn accuracy(&self, y_true: &DVector<u8>, y_pred: &DVector<u8>) -> Result<f64, TreeError> {
        let matrix = self.confusion_matrix(y_true, y_pred)?;
        if y_true.is_empty() {
            return Ok(0.0);
        }

        let correct: usize = matrix.diagonal().iter().sum();

        Ok(correct as f64 / y_true.len() as f64)
    }

    /// Fraction of points predicted as 1 that really are 1.
    fn precision(&self, y_true: &DVector<u8>, y_pred: &DVector<u8>) -> Result<f64, TreeError> {
        let matrix = self.confusion_matrix(y_true, y_pred)?;

        let tp = matrix[(1, 1)];
        let fp = matrix[(0, 1)];

        if tp + fp == 0 {
            return Ok(0.0);
        }
        Ok(tp as f64 / (tp + fp) as f64)
    }

    /// Fraction of points labeled 1 that were predicted as 1.
    fn recall(&self, y_true: &DVector<u8>, y_pred: &DVector<u8>) -> Result<f64, TreeError> {
        let matrix = self.confusion_matrix(y_true, y_pred)?;

        let tp = matrix[(1, 1)];
        let fn_ = matrix[(1, 0)];

        if tp + fn_ == 0 {
            return Ok(0.0);
        }
        Ok(tp as f64 / (tp + fn_) as f64)
    }

    fn f1_score(&self, y_true: &DVector<u8>, y_pred: &DVector<u8>) -> Result<f64, TreeError> {
        let precision = self.precision(y_true, y_pred)?;
        let recall = self.recall(y_true, y_pred)?;

        if precision + recall == 0.0 {
            return Ok(0.0);
        }
        Ok(2.0 * precision * recall / (precision + recall))
    }
}
