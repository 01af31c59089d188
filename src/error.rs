use thiserror::Error;

use crate::graph::DataType;

/// Failure taxonomy of the conversion pipeline.
///
/// Shape metadata is advisory, so `MalformedShape` is downgraded to an
/// unknown shape at its single catch site. Everything touching value
/// integrity (type codes, tensor payloads) or node structure propagates
/// and aborts the conversion.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("data type {dtype:?} has no ONNX equivalent")]
    UnsupportedType { dtype: DataType },

    #[error("unsupported tensor value in {name}: {reason}")]
    UnsupportedTensorValue { name: String, reason: String },

    #[error("malformed shape on {name}: {reason}")]
    MalformedShape { name: String, reason: String },

    #[error("attribute {name} has no ONNX representation: {reason}")]
    UnsupportedAttribute { name: String, reason: String },

    #[error("conversion failed for node {node}: {source}")]
    NodeConversion {
        node: String,
        #[source]
        source: Box<GraphError>,
    },

    #[error("node {name} is not in the graph")]
    MissingNode { name: String },

    #[error("no converter registered for format {format}")]
    UnknownFormat { format: String },

    #[error("failed to load graph from {path}: {reason}")]
    Load { path: String, reason: String },
}
