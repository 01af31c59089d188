//! Mapping from source type codes to ONNX type codes.

use crate::error::GraphError;
use crate::graph::DataType;
use crate::protos::onnx::tensor_proto::DataType as OnnxDataType;

/// Map one source type code to its ONNX counterpart.
///
/// Two entries are deliberate lossy stand-ins: resource handles are stored
/// as INT64 (a storage-compatible width for control-flow plumbing), and
/// quantized uint8 widens to plain UINT8. Downstream consumers depend on
/// exactly these stand-ins; do not change them.
pub fn onnx_dtype(dtype: DataType) -> Result<OnnxDataType, GraphError> {
    match dtype {
        DataType::Float => Ok(OnnxDataType::Float),
        DataType::Half => Ok(OnnxDataType::Float16),
        DataType::Double => Ok(OnnxDataType::Double),
        DataType::Int32 => Ok(OnnxDataType::Int32),
        DataType::Int16 => Ok(OnnxDataType::Int16),
        DataType::Int8 => Ok(OnnxDataType::Int8),
        DataType::Uint8 => Ok(OnnxDataType::Uint8),
        DataType::Uint16 => Ok(OnnxDataType::Uint16),
        DataType::Int64 => Ok(OnnxDataType::Int64),
        DataType::Str => Ok(OnnxDataType::String),
        DataType::Complex64 => Ok(OnnxDataType::Complex64),
        DataType::Complex128 => Ok(OnnxDataType::Complex128),
        DataType::Bool => Ok(OnnxDataType::Bool),
        DataType::Resource => Ok(OnnxDataType::Int64),
        DataType::Quint8 => Ok(OnnxDataType::Uint8),
        other => Err(GraphError::UnsupportedType { dtype: other }),
    }
}

/// Optional variant of [`onnx_dtype`]: `None` passes through unchanged.
/// This is the designed no-op for attributes whose dtype is not yet known.
pub fn map_dtype(dtype: Option<DataType>) -> Result<Option<OnnxDataType>, GraphError> {
    dtype.map(onnx_dtype).transpose()
}
