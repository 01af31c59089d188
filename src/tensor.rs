//! Conversion of raw constant tensors into ONNX `TensorProto` payloads.
//!
//! Numeric element buffers are copied verbatim into `raw_data`; string
//! tensors are decoded element by element into `string_data`, since their
//! source representation stores opaque byte blobs rather than guaranteed
//! text.

use prost::bytes::Bytes;

use crate::error::GraphError;
use crate::graph::{TensorContent, TensorDescriptor};
use crate::protos::onnx::TensorProto;

/// Convert a tensor descriptor into an ONNX tensor payload.
///
/// The element buffer length must match the descriptor's shape exactly,
/// and string elements must be valid UTF-8; violations fail instead of
/// being repaired or truncated.
pub fn tensor_to_onnx(tensor: &TensorDescriptor, name: &str) -> Result<TensorProto, GraphError> {
    let expected = tensor
        .element_count()
        .ok_or_else(|| GraphError::UnsupportedTensorValue {
            name: name.to_string(),
            reason: format!("shape {:?} has unknown dimensions", tensor.shape),
        })?;
    if tensor.data.len() != expected {
        return Err(GraphError::UnsupportedTensorValue {
            name: name.to_string(),
            reason: format!(
                "shape {:?} implies {} elements but the buffer holds {}",
                tensor.shape,
                expected,
                tensor.data.len()
            ),
        });
    }

    let mut proto = TensorProto {
        dims: tensor.shape.clone(),
        data_type: crate::dtype::onnx_dtype(tensor.data_type())? as i32,
        name: name.to_string(),
        ..Default::default()
    };

    // raw_data is little-endian per the ONNX spec, which matches the host
    // layout on every target this crate supports.
    match &tensor.data {
        TensorContent::Float(v) => proto.raw_data = le_bytes(v),
        TensorContent::Half(v) => proto.raw_data = le_bytes(v),
        TensorContent::Double(v) => proto.raw_data = le_bytes(v),
        TensorContent::Int8(v) => proto.raw_data = le_bytes(v),
        TensorContent::Int16(v) => proto.raw_data = le_bytes(v),
        TensorContent::Int32(v) => proto.raw_data = le_bytes(v),
        TensorContent::Int64(v) => proto.raw_data = le_bytes(v),
        TensorContent::Uint8(v) => proto.raw_data = Bytes::from(v.clone()),
        TensorContent::Uint16(v) => proto.raw_data = le_bytes(v),
        TensorContent::Bool(v) => {
            proto.raw_data = Bytes::from(v.iter().map(|b| *b as u8).collect::<Vec<u8>>());
        }
        TensorContent::Str(items) => {
            for (idx, raw) in items.iter().enumerate() {
                let text = std::str::from_utf8(raw).map_err(|_| {
                    GraphError::UnsupportedTensorValue {
                        name: name.to_string(),
                        reason: format!("element {} cannot be coerced to text", idx),
                    }
                })?;
                proto.string_data.push(Bytes::copy_from_slice(text.as_bytes()));
            }
        }
    }

    Ok(proto)
}

fn le_bytes<T: bytemuck::Pod>(values: &[T]) -> Bytes {
    Bytes::from(bytemuck::cast_slice(values).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protos::onnx::tensor_proto::DataType as OnnxDataType;

    #[test]
    fn test_scalar_int64_tensor() {
        let tensor = TensorDescriptor {
            shape: vec![],
            data: TensorContent::Int64(vec![1]),
        };
        let proto = tensor_to_onnx(&tensor, "const:0").unwrap();
        assert_eq!(proto.name, "const:0");
        assert!(proto.dims.is_empty());
        assert_eq!(proto.data_type, OnnxDataType::Int64 as i32);
        assert_eq!(proto.raw_data.as_ref(), 1i64.to_le_bytes());
    }

    #[test]
    fn test_float_tensor_round_trip() {
        let values = vec![1.5f32, -2.25, 0.0, 42.0];
        let tensor = TensorDescriptor {
            shape: vec![2, 2],
            data: TensorContent::Float(values.clone()),
        };
        let proto = tensor_to_onnx(&tensor, "w:0").unwrap();
        assert_eq!(proto.dims, vec![2, 2]);
        let decoded: &[f32] = bytemuck::cast_slice(proto.raw_data.as_ref());
        assert_eq!(decoded, values.as_slice());
    }

    #[test]
    fn test_half_tensor_payload_width() {
        let tensor = TensorDescriptor {
            shape: vec![3],
            data: TensorContent::Half(vec![
                half::f16::from_f32(1.0),
                half::f16::from_f32(-0.5),
                half::f16::from_f32(2.0),
            ]),
        };
        let proto = tensor_to_onnx(&tensor, "h:0").unwrap();
        assert_eq!(proto.data_type, OnnxDataType::Float16 as i32);
        assert_eq!(proto.raw_data.len(), 6);
    }

    #[test]
    fn test_bool_tensor_one_byte_per_element() {
        let tensor = TensorDescriptor {
            shape: vec![3],
            data: TensorContent::Bool(vec![true, false, true]),
        };
        let proto = tensor_to_onnx(&tensor, "b:0").unwrap();
        assert_eq!(proto.raw_data.as_ref(), &[1u8, 0, 1]);
    }

    #[test]
    fn test_string_tensor_elements_survive() {
        let tensor = TensorDescriptor {
            shape: vec![2],
            data: TensorContent::Str(vec![b"alpha".to_vec(), b"beta".to_vec()]),
        };
        let proto = tensor_to_onnx(&tensor, "s:0").unwrap();
        assert!(proto.raw_data.is_empty());
        let decoded: Vec<&str> = proto
            .string_data
            .iter()
            .map(|b| std::str::from_utf8(b).unwrap())
            .collect();
        assert_eq!(decoded, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_string_tensor_invalid_utf8_fails() {
        let tensor = TensorDescriptor {
            shape: vec![1],
            data: TensorContent::Str(vec![vec![0xff, 0xfe]]),
        };
        let err = tensor_to_onnx(&tensor, "s:0").unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnsupportedTensorValue { ref name, .. } if name == "s:0"
        ));
    }

    #[test]
    fn test_element_count_mismatch_fails() {
        let tensor = TensorDescriptor {
            shape: vec![2, 2],
            data: TensorContent::Float(vec![1.0, 2.0, 3.0]),
        };
        assert!(matches!(
            tensor_to_onnx(&tensor, "w:0"),
            Err(GraphError::UnsupportedTensorValue { .. })
        ));
    }

    #[test]
    fn test_unknown_dimension_fails() {
        let tensor = TensorDescriptor {
            shape: vec![-1],
            data: TensorContent::Float(vec![1.0]),
        };
        assert!(matches!(
            tensor_to_onnx(&tensor, "w:0"),
            Err(GraphError::UnsupportedTensorValue { .. })
        ));
    }
}
