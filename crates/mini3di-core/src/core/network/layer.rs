use super::ModelError;
use std::fmt;

/// Layer type codes of the kerasify format.
///
/// Only [`LayerKind::Dense`] can be evaluated; the other kinds are known so
/// that loading reports them by name instead of as garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Dense,
    Convolution2d,
    Flatten,
    Elu,
    Activation,
    MaxPooling2d,
    Lstm,
    Embedding,
}

impl LayerKind {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Dense),
            2 => Some(Self::Convolution2d),
            3 => Some(Self::Flatten),
            4 => Some(Self::Elu),
            5 => Some(Self::Activation),
            6 => Some(Self::MaxPooling2d),
            7 => Some(Self::Lstm),
            8 => Some(Self::Embedding),
            _ => None,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dense => "dense",
            Self::Convolution2d => "convolution2d",
            Self::Flatten => "flatten",
            Self::Elu => "elu",
            Self::Activation => "activation",
            Self::MaxPooling2d => "maxpooling2d",
            Self::Lstm => "lstm",
            Self::Embedding => "embedding",
        };
        f.write_str(name)
    }
}

/// Activation applied after the affine transform of a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activation {
    Linear,
    Relu,
    Softplus,
    Sigmoid,
    Tanh,
    HardSigmoid,
}

impl Activation {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Linear),
            2 => Some(Self::Relu),
            3 => Some(Self::Softplus),
            4 => Some(Self::Sigmoid),
            5 => Some(Self::Tanh),
            6 => Some(Self::HardSigmoid),
            _ => None,
        }
    }

    /// Applies the activation to a single value.
    ///
    /// NaN inputs stay NaN for every activation.
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Linear => x,
            Self::Relu => {
                if x < 0.0 {
                    0.0
                } else {
                    x
                }
            }
            Self::Softplus => x.exp().ln_1p(),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
            Self::HardSigmoid => {
                if x <= -2.5 {
                    0.0
                } else if x >= 2.5 {
                    1.0
                } else {
                    x * 0.2 + 0.5
                }
            }
        }
    }
}

/// A fully connected layer computing `activation(x · W + b)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    input_dim: usize,
    output_dim: usize,
    /// Row-major `input_dim × output_dim` matrix.
    weights: Vec<f32>,
    biases: Vec<f32>,
    activation: Activation,
}

impl DenseLayer {
    pub fn new(
        input_dim: usize,
        output_dim: usize,
        weights: Vec<f32>,
        biases: Vec<f32>,
        activation: Activation,
    ) -> Result<Self, ModelError> {
        if input_dim == 0 || output_dim == 0 {
            return Err(ModelError::Malformed {
                reason: format!("dense layer has empty shape {input_dim}x{output_dim}"),
            });
        }
        if input_dim.checked_mul(output_dim) != Some(weights.len()) {
            return Err(ModelError::Malformed {
                reason: format!(
                    "dense layer expects {input_dim}x{output_dim} weights, got {}",
                    weights.len()
                ),
            });
        }
        if biases.len() != output_dim {
            return Err(ModelError::Malformed {
                reason: format!(
                    "dense layer with {output_dim} outputs has {} biases",
                    biases.len()
                ),
            });
        }
        Ok(Self {
            input_dim,
            output_dim,
            weights,
            biases,
            activation,
        })
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn forward(&self, x: &[f32]) -> Vec<f32> {
        debug_assert_eq!(x.len(), self.input_dim);
        let mut out = vec![0.0f32; self.output_dim];
        for (xi, row) in x.iter().zip(self.weights.chunks_exact(self.output_dim)) {
            for (o, w) in out.iter_mut().zip(row) {
                *o += xi * w;
            }
        }
        for (o, b) in out.iter_mut().zip(&self.biases) {
            *o = self.activation.apply(*o + b);
        }
        out
    }
}

/// A layer of the embedding network.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Dense(DenseLayer),
}

impl Layer {
    pub fn input_dim(&self) -> usize {
        match self {
            Self::Dense(dense) => dense.input_dim(),
        }
    }

    pub fn output_dim(&self) -> usize {
        match self {
            Self::Dense(dense) => dense.output_dim(),
        }
    }

    pub fn forward(&self, x: &[f32]) -> Vec<f32> {
        match self {
            Self::Dense(dense) => dense.forward(x),
        }
    }
}

impl From<DenseLayer> for Layer {
    fn from(layer: DenseLayer) -> Self {
        Self::Dense(layer)
    }
}
