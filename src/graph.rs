use std::collections::BTreeMap;

use half::f16;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

/// Element type codes as the source framework tags them.
///
/// Several codes (`Uint32`, `Uint64`, the quantized integer kinds,
/// `Bfloat16`, `Variant`) exist in source graphs but have no entry in the
/// ONNX mapping table; converting a graph that uses one fails loudly
/// instead of defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Float,
    Half,
    Double,
    Int32,
    Int16,
    Int8,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int64,
    Str,
    Complex64,
    Complex128,
    Bool,
    Resource,
    Quint8,
    Qint8,
    Qint32,
    Bfloat16,
    Variant,
}

/// Static shape metadata as the source framework records it: an ordered
/// dimension list (a negative size marks an unknown dimension), or
/// "unknown rank" when no dimension list is usable at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    #[serde(default)]
    pub unknown_rank: bool,
    #[serde(default)]
    pub dims: Vec<i64>,
}

/// Flat element buffer of a constant tensor, tagged by element kind.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorContent {
    Float(Vec<f32>),
    Half(Vec<f16>),
    Double(Vec<f64>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Bool(Vec<bool>),
    /// String elements arrive as opaque byte blobs. They are not guaranteed
    /// to be decoded text; the tensor codec coerces them element by element.
    Str(#[serde_as(as = "Vec<Base64>")] Vec<Vec<u8>>),
}

impl TensorContent {
    pub fn data_type(&self) -> DataType {
        match self {
            TensorContent::Float(_) => DataType::Float,
            TensorContent::Half(_) => DataType::Half,
            TensorContent::Double(_) => DataType::Double,
            TensorContent::Int8(_) => DataType::Int8,
            TensorContent::Int16(_) => DataType::Int16,
            TensorContent::Int32(_) => DataType::Int32,
            TensorContent::Int64(_) => DataType::Int64,
            TensorContent::Uint8(_) => DataType::Uint8,
            TensorContent::Uint16(_) => DataType::Uint16,
            TensorContent::Bool(_) => DataType::Bool,
            TensorContent::Str(_) => DataType::Str,
        }
    }

    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            TensorContent::Float(v) => v.len(),
            TensorContent::Half(v) => v.len(),
            TensorContent::Double(v) => v.len(),
            TensorContent::Int8(v) => v.len(),
            TensorContent::Int16(v) => v.len(),
            TensorContent::Int32(v) => v.len(),
            TensorContent::Int64(v) => v.len(),
            TensorContent::Uint8(v) => v.len(),
            TensorContent::Uint16(v) => v.len(),
            TensorContent::Bool(v) => v.len(),
            TensorContent::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A raw constant tensor: shape plus a flat typed element buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorDescriptor {
    #[serde(default)]
    pub shape: Vec<i64>,
    pub data: TensorContent,
}

impl TensorDescriptor {
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Element count implied by the shape; an empty shape is a scalar.
    /// `None` when a dimension is unknown or the product overflows.
    pub fn element_count(&self) -> Option<usize> {
        let mut count = 1usize;
        for dim in &self.shape {
            if *dim < 0 {
                return None;
            }
            count = count.checked_mul(*dim as usize)?;
        }
        Some(count)
    }
}

/// One attribute value. The bag is loosely typed: the value kind varies per
/// attribute name, and list attributes nest any of the scalar kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrValue {
    Int(i64),
    Float(f32),
    Str(String),
    Bool(bool),
    Type(DataType),
    Shape(ShapeDescriptor),
    Tensor(TensorDescriptor),
    List(Vec<AttrValue>),
}

/// One declared output of a node, identified by its port name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeOutput {
    pub name: String,
    #[serde(default)]
    pub dtype: Option<DataType>,
    /// Static shape if the source graph carries one; `None` means unknown.
    #[serde(default)]
    pub shape: Option<Vec<i64>>,
}

/// A node of the source graph: identity, ordered input/output references,
/// and the attribute bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: String,
    #[serde(rename = "type")]
    pub op_type: String,
    /// Input port names in order; a leading `^` marks a control dependency.
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<NodeOutput>,
    #[serde(default)]
    pub attrs: BTreeMap<String, AttrValue>,
}

impl GraphNode {
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn is_const(&self) -> bool {
        self.op_type == "Const"
    }

    /// Embedded payload of a `Const` node's `value` attribute.
    pub fn const_value(&self) -> Option<&TensorDescriptor> {
        if !self.is_const() {
            return None;
        }
        match self.attr("value") {
            Some(AttrValue::Tensor(tensor)) => Some(tensor),
            _ => None,
        }
    }
}

/// An ordered source node list plus the graph-level input/output ports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphInfo {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl GraphInfo {
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// Derived identifier for a node's first output: `"{node}:0"`.
pub fn port_name(node: &str) -> String {
    format!("{}:0", node)
}

/// Node name behind an input reference: strips the control-dependency
/// marker (`^name`) and the port suffix (`name:1`).
pub fn node_name(port: &str) -> &str {
    let name = port.strip_prefix('^').unwrap_or(port);
    match name.split_once(':') {
        Some((node, _)) => node,
        None => name,
    }
}
