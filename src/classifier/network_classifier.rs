use std::path::Path;
use std::sync::Mutex;

use crate::activation::ActivationFunction;
use crate::classifier::{Classifier, ProbabilityVector};
use crate::error::{InferenceError, StartupError};
use crate::network::{InputType, Network};
use crate::preprocess::{Tensor, DEFAULT_TARGET_SIZE};

/// Classifier backed by a [`Network`] loaded from its JSON artifact.
///
/// `Network::forward` writes per-layer activations, so concurrent requests
/// take turns on the mutex.
#[derive(Debug)]
pub struct NetworkClassifier {
    network: Mutex<Network>,
    input_size: (u32, u32),
    output_len: usize,
}

impl NetworkClassifier {
    pub fn load(path: impl AsRef<Path>) -> Result<NetworkClassifier, StartupError> {
        let path = path.as_ref();
        let fail = |reason: String| StartupError::ModelLoad { path: path.to_path_buf(), reason };

        let network = Network::load_json(path).map_err(|e| fail(e.to_string()))?;
        let classifier = NetworkClassifier::from_network(network).map_err(fail)?;
        tracing::info!(
            path = %path.display(),
            width = classifier.input_size.0,
            height = classifier.input_size.1,
            classes = classifier.output_len,
            "Model loaded"
        );
        Ok(classifier)
    }

    /// Wraps an in-memory network after checking it accepts RGB images and
    /// ends in a layer whose outputs lie in [0, 1].
    ///
    /// Networks without metadata are assumed to take the default 224×224 input.
    pub fn from_network(network: Network) -> Result<NetworkClassifier, String> {
        network.validate()?;

        if let Some(head) = network.layers.last() {
            if !matches!(head.activator, ActivationFunction::Softmax | ActivationFunction::Sigmoid) {
                return Err(format!(
                    "output layer uses {:?}, which does not produce probabilities",
                    head.activator
                ));
            }
        }

        let input_type = network.metadata.as_ref().and_then(|m| m.input_type.clone());
        let (width, height) = match input_type {
            Some(InputType::ImageRgb { width, height }) => (width, height),
            None => DEFAULT_TARGET_SIZE,
            Some(other) => return Err(format!("model expects {:?} input, not an RGB image", other)),
        };
        if width == 0 || height == 0 {
            return Err(format!("model declares an empty {}x{} input", width, height));
        }

        let expected = width as usize * height as usize * 3;
        if network.input_size() != expected {
            return Err(format!(
                "first layer takes {} inputs but a {}x{} RGB image has {}",
                network.input_size(), width, height, expected
            ));
        }

        let output_len = network.output_size();
        Ok(NetworkClassifier {
            network: Mutex::new(network),
            input_size: (width, height),
            output_len,
        })
    }

    fn expected_shape(&self) -> [usize; 4] {
        let (width, height) = self.input_size;
        [1, height as usize, width as usize, 3]
    }
}

impl Classifier for NetworkClassifier {
    fn input_size(&self) -> (u32, u32) {
        self.input_size
    }

    fn output_len(&self) -> usize {
        self.output_len
    }

    fn predict(&self, tensor: &Tensor) -> Result<ProbabilityVector, InferenceError> {
        let expected = self.expected_shape();
        if tensor.shape() != expected {
            return Err(InferenceError::ShapeMismatch { expected, actual: tensor.shape() });
        }

        let output = {
            let mut network = self.network.lock().map_err(|_| InferenceError::Poisoned)?;
            network.forward(tensor.data().to_vec())
        };

        if output.len() != self.output_len {
            return Err(InferenceError::OutputLength { expected: self.output_len, actual: output.len() });
        }
        if let Some(index) = output.iter().position(|p| !p.is_finite()) {
            return Err(InferenceError::NonFinite { index });
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;
    use crate::network::ModelMetadata;

    fn rgb_network(width: u32, height: u32, classes: usize) -> Network {
        let inputs = (width * height * 3) as usize;
        Network::new(vec![(classes, inputs, ActivationFunction::Softmax)]).with_metadata(ModelMetadata {
            description: None,
            input_type: Some(InputType::ImageRgb { width, height }),
        })
    }

    #[test]
    fn predicts_a_distribution_over_classes() {
        let classifier = NetworkClassifier::from_network(rgb_network(2, 3, 4)).unwrap();
        assert_eq!(classifier.input_size(), (2, 3));
        assert_eq!(classifier.output_len(), 4);

        let tensor = Tensor::new([1, 3, 2, 3], vec![0.5; 18]).unwrap();
        let probs = classifier.predict(&tensor).unwrap();
        assert_eq!(probs.len(), 4);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn deterministic_for_a_fixed_model() {
        let classifier = NetworkClassifier::from_network(rgb_network(2, 2, 3)).unwrap();
        let tensor = Tensor::new([1, 2, 2, 3], (0..12).map(|v| v as f64 / 12.0).collect()).unwrap();
        assert_eq!(classifier.predict(&tensor).unwrap(), classifier.predict(&tensor).unwrap());
    }

    #[test]
    fn wrong_tensor_shape_is_an_inference_error() {
        let classifier = NetworkClassifier::from_network(rgb_network(2, 2, 3)).unwrap();
        let tensor = Tensor::new([1, 2, 3, 2], vec![0.0; 12]).unwrap();
        assert!(matches!(
            classifier.predict(&tensor),
            Err(InferenceError::ShapeMismatch { expected: [1, 2, 2, 3], actual: [1, 2, 3, 2] })
        ));
    }

    #[test]
    fn rejects_grayscale_models() {
        let net = Network::new(vec![(3, 4, ActivationFunction::Softmax)]).with_metadata(ModelMetadata {
            description: None,
            input_type: Some(InputType::ImageGrayscale { width: 2, height: 2 }),
        });
        assert!(NetworkClassifier::from_network(net).is_err());
    }

    #[test]
    fn rejects_first_layer_width_mismatch() {
        let net = Network::new(vec![(3, 10, ActivationFunction::Softmax)]).with_metadata(ModelMetadata {
            description: None,
            input_type: Some(InputType::ImageRgb { width: 2, height: 2 }),
        });
        let err = NetworkClassifier::from_network(net).unwrap_err();
        assert!(err.contains("first layer"), "{}", err);
    }

    #[test]
    fn rejects_heads_that_are_not_probabilities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mushroom.json");
        let mut net = Network::new(vec![(2, 3, ActivationFunction::Identity)]).with_metadata(ModelMetadata {
            description: None,
            input_type: Some(InputType::ImageRgb { width: 1, height: 1 }),
        });
        net.layers[0].biases = Matrix::row(vec![3.7, -2.0]);
        net.save_json(&path).unwrap();

        let err = NetworkClassifier::load(&path).unwrap_err();
        match err {
            StartupError::ModelLoad { reason, .. } => assert!(reason.contains("Identity"), "{}", reason),
            other => panic!("unexpected error: {}", other),
        }

        net.layers[0].activator = ActivationFunction::Sigmoid;
        assert!(NetworkClassifier::from_network(net).is_ok());
    }

    #[test]
    fn missing_artifact_is_a_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = NetworkClassifier::load(dir.path().join("mushroom.json")).unwrap_err();
        assert!(matches!(err, StartupError::ModelLoad { .. }));
    }

    #[test]
    fn loads_saved_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mushroom.json");
        rgb_network(4, 4, 5).save_json(&path).unwrap();

        let classifier = NetworkClassifier::load(&path).unwrap();
        assert_eq!(classifier.input_size(), (4, 4));
        assert_eq!(classifier.output_len(), 5);
    }
}
