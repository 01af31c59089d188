pub mod attr;
pub mod converters;
pub mod dtype;
pub mod error;
pub mod graph;
pub mod loader;
pub mod optimize;
pub mod protos;
pub mod shape_inference;
pub mod tensor;

pub use attr::{policy_for, resolve_node_attrs, AttrPolicy, IGNORED_ATTRS};
pub use converters::{
    ConvertedGraph, ConverterRegistry, GraphConversion, GraphConverter, OnnxConverter,
};
pub use dtype::{map_dtype, onnx_dtype};
pub use error::GraphError;
pub use graph::{
    node_name, port_name, AttrValue, DataType, GraphInfo, GraphNode, NodeOutput, ShapeDescriptor,
    TensorContent, TensorDescriptor,
};
pub use loader::load_graph_from_path;
pub use optimize::{
    extract_sub_graph, optimize_graph, GraphTransform, PassthroughTransform,
    TRANSFORM_FOLD_BATCH_NORMS, TRANSFORM_FOLD_CONSTANTS, TRANSFORM_FOLD_OLD_BATCH_NORMS,
    TRANSFORM_REMOVE_COLOCATION,
};
pub use shape_inference::{resolve_output_shape, shape_attr_dims};
pub use tensor::tensor_to_onnx;
