//! Reader for the kerasify weight format.
//!
//! The stream is little-endian. It starts with a `u32` layer count, followed
//! by each layer as a `u32` type code and a type-specific body. Dense layers
//! (type 1) are laid out as:
//!
//! ```text
//! u32 rows | u32 cols | u32 bias_count | rows*cols f32 (row-major) | bias_count f32 | u32 activation
//! ```
//!
//! Any other layer type is rejected, since there is no way to skip over its
//! body.

use super::layer::{Activation, DenseLayer, Layer, LayerKind};
use super::{Model, ModelError};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{info, instrument, trace};

fn read_failure(field: &'static str, layer: Option<usize>, err: io::Error) -> ModelError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        let reason = match layer {
            Some(layer) => format!("stream ended while reading {field} of layer {layer}"),
            None => format!("stream ended while reading {field}"),
        };
        ModelError::Malformed { reason }
    } else {
        ModelError::Read(err)
    }
}

fn read_u32<R: Read>(
    reader: &mut R,
    field: &'static str,
    layer: Option<usize>,
) -> Result<u32, ModelError> {
    reader
        .read_u32::<LittleEndian>()
        .map_err(|e| read_failure(field, layer, e))
}

fn read_f32s<R: Read>(
    reader: &mut R,
    count: usize,
    field: &'static str,
    layer: usize,
) -> Result<Vec<f32>, ModelError> {
    let byte_len = count
        .checked_mul(4)
        .ok_or_else(|| ModelError::Malformed {
            reason: format!("{field} of layer {layer} has an impossible size ({count} values)"),
        })?;

    // Read through `take` so a corrupt size cannot trigger a huge allocation
    // before the stream runs out.
    let mut bytes = Vec::new();
    reader
        .by_ref()
        .take(byte_len as u64)
        .read_to_end(&mut bytes)
        .map_err(|e| read_failure(field, Some(layer), e))?;
    if bytes.len() != byte_len {
        return Err(ModelError::Malformed {
            reason: format!(
                "stream ended while reading {field} of layer {layer} ({} of {byte_len} bytes)",
                bytes.len()
            ),
        });
    }

    let mut values = vec![0.0f32; count];
    LittleEndian::read_f32_into(&bytes, &mut values);
    Ok(values)
}

fn read_dense<R: Read>(reader: &mut R, index: usize) -> Result<DenseLayer, ModelError> {
    let rows = read_u32(reader, "weight rows", Some(index))? as usize;
    let cols = read_u32(reader, "weight columns", Some(index))? as usize;
    let bias_count = read_u32(reader, "bias count", Some(index))? as usize;
    let weight_count = rows.checked_mul(cols).ok_or_else(|| ModelError::Malformed {
        reason: format!("weights of layer {index} have an impossible shape {rows}x{cols}"),
    })?;

    let weights = read_f32s(reader, weight_count, "weights", index)?;
    let biases = read_f32s(reader, bias_count, "biases", index)?;

    let code = read_u32(reader, "activation", Some(index))?;
    let activation = Activation::from_code(code).ok_or(ModelError::UnsupportedActivation {
        layer: index,
        code,
    })?;

    trace!(layer = index, rows, cols, ?activation, "Read dense layer.");
    DenseLayer::new(rows, cols, weights, biases, activation)
}

/// Reads a model from a kerasify stream.
///
/// # Errors
///
/// Returns [`ModelError::Malformed`] if the stream is truncated or its
/// dimensions are inconsistent, and [`ModelError::UnsupportedLayer`] or
/// [`ModelError::UnsupportedActivation`] for anything but dense layers with
/// a known activation.
pub fn read_model<R: Read>(reader: &mut R) -> Result<Model, ModelError> {
    let layer_count = read_u32(reader, "layer count", None)? as usize;

    let mut layers = Vec::new();
    for index in 0..layer_count {
        let code = read_u32(reader, "layer type", Some(index))?;
        match LayerKind::from_code(code) {
            Some(LayerKind::Dense) => layers.push(Layer::Dense(read_dense(reader, index)?)),
            _ => return Err(ModelError::UnsupportedLayer { layer: index, code }),
        }
    }

    Model::new(layers)
}

impl Model {
    /// Loads a model from a kerasify file.
    #[instrument(skip_all, name = "model_loading")]
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let file = File::open(path).map_err(|e| ModelError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let model = Self::read_from(&mut BufReader::new(file))?;
        info!(
            path = %path.display(),
            layers = model.layers().len(),
            input_dim = ?model.input_dim(),
            output_dim = ?model.output_dim(),
            "Loaded embedding model."
        );
        Ok(model)
    }

    /// Reads a model from any kerasify byte stream.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, ModelError> {
        read_model(reader)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    /// Serializes dense layers in kerasify layout, for building test fixtures.
    pub(crate) fn encode_dense_layers(
        layers: &[(usize, usize, Vec<f32>, Vec<f32>, u32)],
    ) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(layers.len() as u32).to_le_bytes());
        for (rows, cols, weights, biases, activation) in layers {
            bytes.extend_from_slice(&1u32.to_le_bytes());
            bytes.extend_from_slice(&(*rows as u32).to_le_bytes());
            bytes.extend_from_slice(&(*cols as u32).to_le_bytes());
            bytes.extend_from_slice(&(biases.len() as u32).to_le_bytes());
            for w in weights {
                bytes.extend_from_slice(&w.to_le_bytes());
            }
            for b in biases {
                bytes.extend_from_slice(&b.to_le_bytes());
            }
            bytes.extend_from_slice(&activation.to_le_bytes());
        }
        bytes
    }

    fn two_layer_bytes() -> Vec<u8> {
        encode_dense_layers(&[
            (2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![0.5, 0.25, -0.5], 2),
            (3, 1, vec![1.0, 1.0, 1.0], vec![-1.0], 1),
        ])
    }

    #[test]
    fn reads_dense_layers_with_row_major_weights() {
        let model = read_model(&mut Cursor::new(two_layer_bytes())).unwrap();

        assert_eq!(model.layers().len(), 2);
        assert_eq!(model.input_dim(), Some(2));
        assert_eq!(model.output_dim(), Some(1));
        let Layer::Dense(first) = &model.layers()[0];
        assert_eq!(first.activation(), Activation::Relu);
        // [1, 0] selects the first weight row: [1, 2, 3] + biases
        assert_eq!(first.forward(&[1.0, 0.0]), vec![1.5, 2.25, 2.5]);
        let Layer::Dense(second) = &model.layers()[1];
        assert_eq!(second.activation(), Activation::Linear);
    }

    #[test]
    fn reads_empty_model() {
        let model = read_model(&mut Cursor::new(0u32.to_le_bytes().to_vec())).unwrap();
        assert!(model.layers().is_empty());
    }

    #[test]
    fn ignores_trailing_bytes() {
        let mut bytes = two_layer_bytes();
        bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(read_model(&mut Cursor::new(bytes)).is_ok());
    }

    #[test]
    fn rejects_truncated_weights() {
        let mut bytes = two_layer_bytes();
        bytes.truncate(4 + 4 + 12 + 8);
        let result = read_model(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(ModelError::Malformed { .. })));
    }

    #[test]
    fn rejects_truncated_activation() {
        let mut bytes = two_layer_bytes();
        bytes.truncate(bytes.len() - 2);
        let result = read_model(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(ModelError::Malformed { .. })));
    }

    #[test]
    fn rejects_empty_stream() {
        let result = read_model(&mut Cursor::new(Vec::new()));
        assert!(matches!(result, Err(ModelError::Malformed { .. })));
    }

    #[test]
    fn rejects_non_dense_layer() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&3u32.to_le_bytes());
        let result = read_model(&mut Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(ModelError::UnsupportedLayer { layer: 0, code: 3 })
        ));
    }

    #[test]
    fn rejects_unknown_layer_code_after_valid_layer() {
        let mut bytes = two_layer_bytes();
        bytes[..4].copy_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&99u32.to_le_bytes());
        let result = read_model(&mut Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(ModelError::UnsupportedLayer { layer: 2, code: 99 })
        ));
    }

    #[test]
    fn rejects_unknown_activation() {
        let bytes = encode_dense_layers(&[(1, 1, vec![1.0], vec![0.0], 9)]);
        let result = read_model(&mut Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(ModelError::UnsupportedActivation { layer: 0, code: 9 })
        ));
    }

    #[test]
    fn rejects_bias_count_not_matching_columns() {
        let bytes = encode_dense_layers(&[(1, 2, vec![1.0, 1.0], vec![0.0], 1)]);
        let result = read_model(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(ModelError::Malformed { .. })));
    }

    #[test]
    fn rejects_huge_declared_size_without_allocating() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        let result = read_model(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(ModelError::Malformed { .. })));
    }

    #[test]
    fn load_reads_model_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&two_layer_bytes()).unwrap();

        let model = Model::load(file.path()).unwrap();

        assert_eq!(model.layers().len(), 2);
    }

    #[test]
    fn load_returns_io_error_for_nonexistent_file() {
        let result = Model::load(Path::new("nonexistent_weights.kerasify"));
        assert!(matches!(result, Err(ModelError::Io { .. })));
    }
}
