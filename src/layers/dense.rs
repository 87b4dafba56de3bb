use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    /// Activations from the most recent forward pass (1 × size).
    #[serde(skip)]
    pub neurons: Matrix,
    /// input_size × size
    pub weights: Matrix,
    /// 1 × size
    pub biases: Matrix,
    pub activator: ActivationFunction
}

impl Layer {
    /// Zero weights and biases; real values come from a saved artifact or
    /// are assigned by the caller.
    pub fn new(size: usize, input_size: usize, activation: ActivationFunction) -> Layer {
        Layer {
            size,
            neurons: Matrix::zeros(1, size),
            weights: Matrix::zeros(input_size, size),
            biases: Matrix::zeros(1, size),
            activator: activation
        }
    }

    /// Number of inputs this layer accepts.
    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    /// Describes the first internal inconsistency found, if any.
    pub fn shape_error(&self) -> Option<String> {
        if !self.weights.is_well_formed() {
            return Some(format!(
                "weights declare {}x{} but data does not match",
                self.weights.rows, self.weights.cols
            ));
        }
        if !self.biases.is_well_formed() {
            return Some("biases data does not match declared shape".to_owned());
        }
        if self.weights.cols != self.size {
            return Some(format!(
                "weights have {} columns, layer size is {}",
                self.weights.cols, self.size
            ));
        }
        if self.biases.rows != 1 || self.biases.cols != self.size {
            return Some(format!(
                "biases are {}x{}, expected 1x{}",
                self.biases.rows, self.biases.cols, self.size
            ));
        }
        None
    }

    /// a = f(xW + b). Callers guarantee `input.len() == self.input_size()`.
    pub fn feed_from(&mut self, input: Vec<f64>) -> Vec<f64> {
        let z = &(&Matrix::row(input) * &self.weights) + &self.biases;
        let a = Matrix::row(self.activator.apply(&z.data[0]));
        self.neurons = a.clone();
        a.data.into_iter().next().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_layer(activator: ActivationFunction) -> Layer {
        Layer {
            size: 2,
            neurons: Matrix::zeros(1, 2),
            weights: Matrix::from_data(vec![vec![1.0, -1.0], vec![2.0, 0.0]]),
            biases: Matrix::row(vec![0.5, 0.0]),
            activator,
        }
    }

    #[test]
    fn feed_from_applies_affine_then_activation() {
        let mut layer = fixed_layer(ActivationFunction::ReLU);
        let out = layer.feed_from(vec![1.0, 1.0]);
        assert_eq!(out, vec![3.5, 0.0]);
        assert_eq!(layer.neurons, Matrix::row(vec![3.5, 0.0]));
    }

    #[test]
    fn reports_bias_shape_mismatch() {
        let mut layer = fixed_layer(ActivationFunction::Identity);
        layer.biases = Matrix::row(vec![0.0, 0.0, 0.0]);
        assert!(layer.shape_error().is_some());
    }

    #[test]
    fn new_layer_is_consistent() {
        let layer = Layer::new(4, 6, ActivationFunction::Softmax);
        assert_eq!(layer.input_size(), 6);
        assert!(layer.shape_error().is_none());
        assert_eq!(layer.weights, Matrix::zeros(6, 4));
        assert_eq!(layer.biases, Matrix::zeros(1, 4));
    }
}
