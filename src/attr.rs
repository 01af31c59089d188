//! Per-name attribute resolution.
//!
//! Every source attribute is routed through a closed policy registry:
//! dropped, type-mapped, renamed, shape-resolved, tensor-decoded, or copied
//! raw. Values stay in the source tagged union until the very end of
//! resolution and only then become ONNX `AttributeProto`s, so the two type
//! systems never mix mid-pipeline.

use std::collections::HashMap;

use prost::bytes::Bytes;

use crate::dtype::onnx_dtype;
use crate::error::GraphError;
use crate::graph::{port_name, AttrValue, GraphNode};
use crate::protos::onnx::attribute_proto::AttributeType;
use crate::protos::onnx::tensor_proto::DataType as OnnxDataType;
use crate::protos::onnx::{AttributeProto, TensorProto};
use crate::shape_inference::shape_attr_dims;
use crate::tensor::tensor_to_onnx;

/// Source-framework implementation details with no meaning in ONNX.
pub const IGNORED_ATTRS: &[&str] = &[
    "unknown_rank",
    "_class",
    "Tshape",
    "use_cudnn_on_gpu",
    "Index",
    "Tpaddings",
    "TI",
    "Tparams",
    "Tindices",
    "Tlen",
    "Tdim",
    "dynamic_size",
    "Tmultiples",
    "Tblock_shape",
    "Tcrops",
    "index_type",
    "Taxis",
    "U",
    "maxval",
    "Tout",
    "Tlabels",
    "Tindex",
    "element_shape",
    "Targmax",
];

/// What to do with one named attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrPolicy {
    /// Discard; the attribute carries no semantic weight downstream.
    Drop,
    /// The value is a type code; emit the mapped ONNX code.
    MapType,
    /// Emit under a different name, type-mapped, to match ONNX conventions.
    Rename(&'static str),
    /// Parse as a declared static shape.
    ResolveShape,
    /// Decode an embedded constant tensor.
    DecodeTensor,
    /// Copy the value through unchanged.
    CopyRaw,
}

/// Policy registry keyed by attribute name.
pub fn policy_for(name: &str) -> AttrPolicy {
    match name {
        "dtype" => AttrPolicy::MapType,
        // Tidx is used by Range, out_idx by ListDiff.
        "output_type" | "output_dtype" | "out_type" | "Tidx" | "out_idx" => AttrPolicy::MapType,
        "shape" => AttrPolicy::ResolveShape,
        "value" => AttrPolicy::DecodeTensor,
        "DstT" => AttrPolicy::Rename("to"),
        // SrcT is redundant once DstT has been resolved.
        "SrcT" | "Tperm" => AttrPolicy::Drop,
        _ if IGNORED_ATTRS.contains(&name) => AttrPolicy::Drop,
        _ => AttrPolicy::CopyRaw,
    }
}

/// Resolve a node's whole attribute bag into ONNX attributes.
///
/// Side channels: every attribute occurrence bumps `attr_counts` (before
/// dispatch, so dropped attributes still count), and a single-valued
/// primary type attribute `T` records a per-node type hint in `dtypes`
/// under the node's own name.
pub fn resolve_node_attrs(
    node: &GraphNode,
    dtypes: &mut HashMap<String, Option<OnnxDataType>>,
    attr_counts: &mut HashMap<String, usize>,
) -> Result<Vec<AttributeProto>, GraphError> {
    let mut resolved = Vec::new();

    for (name, value) in &node.attrs {
        *attr_counts.entry(name.clone()).or_insert(0) += 1;

        // "T" never becomes an ONNX attribute; list-valued codes carry no
        // single per-node type and are skipped.
        if name == "T" {
            if let AttrValue::Type(dtype) = value {
                dtypes.insert(node.name.clone(), Some(onnx_dtype(*dtype)?));
            }
            continue;
        }

        match policy_for(name) {
            AttrPolicy::Drop => {}
            AttrPolicy::MapType => resolved.push(int_attr(name, type_code(name, value)?)),
            AttrPolicy::Rename(target) => resolved.push(int_attr(target, type_code(name, value)?)),
            AttrPolicy::ResolveShape => {
                if let Some(dims) = shape_attr_dims(node) {
                    resolved.push(ints_attr(name, dims));
                }
            }
            AttrPolicy::DecodeTensor => match value {
                AttrValue::Tensor(tensor) => {
                    let payload = tensor_to_onnx(tensor, &port_name(&node.name))?;
                    resolved.push(tensor_attr(name, payload));
                }
                other => {
                    return Err(GraphError::UnsupportedAttribute {
                        name: name.clone(),
                        reason: format!("expected an embedded tensor, found {}", kind_name(other)),
                    })
                }
            },
            AttrPolicy::CopyRaw => resolved.push(raw_attr(node, name, value)?),
        }
    }

    Ok(resolved)
}

fn type_code(name: &str, value: &AttrValue) -> Result<i64, GraphError> {
    match value {
        AttrValue::Type(dtype) => Ok(onnx_dtype(*dtype)? as i64),
        other => Err(GraphError::UnsupportedAttribute {
            name: name.to_string(),
            reason: format!("expected a type code, found {}", kind_name(other)),
        }),
    }
}

fn raw_attr(node: &GraphNode, name: &str, value: &AttrValue) -> Result<AttributeProto, GraphError> {
    match value {
        AttrValue::Int(i) => Ok(int_attr(name, *i)),
        AttrValue::Float(f) => Ok(float_attr(name, *f)),
        AttrValue::Str(s) => Ok(string_attr(name, s)),
        AttrValue::Bool(b) => Ok(int_attr(name, *b as i64)),
        // Even unpoliced type codes go through the mapper; a source-framework
        // enum integer must never leak into an ONNX attribute.
        AttrValue::Type(dtype) => Ok(int_attr(name, onnx_dtype(*dtype)? as i64)),
        AttrValue::Shape(shape) => Ok(ints_attr(name, shape.dims.clone())),
        AttrValue::Tensor(tensor) => Ok(tensor_attr(
            name,
            tensor_to_onnx(tensor, &port_name(&node.name))?,
        )),
        AttrValue::List(items) => list_attr(node, name, items),
    }
}

fn list_attr(
    node: &GraphNode,
    name: &str,
    items: &[AttrValue],
) -> Result<AttributeProto, GraphError> {
    if items.is_empty() {
        return Ok(ints_attr(name, vec![]));
    }
    if items.iter().all(|v| matches!(v, AttrValue::Int(_))) {
        let ints = items
            .iter()
            .map(|v| match v {
                AttrValue::Int(i) => *i,
                _ => unreachable!(),
            })
            .collect();
        return Ok(ints_attr(name, ints));
    }
    if items.iter().all(|v| matches!(v, AttrValue::Float(_))) {
        let floats = items
            .iter()
            .map(|v| match v {
                AttrValue::Float(f) => *f,
                _ => unreachable!(),
            })
            .collect();
        return Ok(floats_attr(name, floats));
    }
    if items.iter().all(|v| matches!(v, AttrValue::Bool(_))) {
        let ints = items
            .iter()
            .map(|v| match v {
                AttrValue::Bool(b) => *b as i64,
                _ => unreachable!(),
            })
            .collect();
        return Ok(ints_attr(name, ints));
    }
    if items.iter().all(|v| matches!(v, AttrValue::Str(_))) {
        let strings = items
            .iter()
            .map(|v| match v {
                AttrValue::Str(s) => Bytes::copy_from_slice(s.as_bytes()),
                _ => unreachable!(),
            })
            .collect();
        return Ok(strings_attr(name, strings));
    }
    if items.iter().all(|v| matches!(v, AttrValue::Type(_))) {
        let mut ints = Vec::with_capacity(items.len());
        for item in items {
            if let AttrValue::Type(dtype) = item {
                ints.push(onnx_dtype(*dtype)? as i64);
            }
        }
        return Ok(ints_attr(name, ints));
    }
    if items.iter().all(|v| matches!(v, AttrValue::Tensor(_))) {
        let mut tensors = Vec::with_capacity(items.len());
        for item in items {
            if let AttrValue::Tensor(tensor) = item {
                tensors.push(tensor_to_onnx(tensor, &port_name(&node.name))?);
            }
        }
        return Ok(tensors_attr(name, tensors));
    }
    Err(GraphError::UnsupportedAttribute {
        name: name.to_string(),
        reason: "heterogeneous or nested list".to_string(),
    })
}

fn kind_name(value: &AttrValue) -> &'static str {
    match value {
        AttrValue::Int(_) => "int",
        AttrValue::Float(_) => "float",
        AttrValue::Str(_) => "string",
        AttrValue::Bool(_) => "bool",
        AttrValue::Type(_) => "type",
        AttrValue::Shape(_) => "shape",
        AttrValue::Tensor(_) => "tensor",
        AttrValue::List(_) => "list",
    }
}

fn int_attr(name: &str, i: i64) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Int as i32,
        i,
        ..Default::default()
    }
}

fn float_attr(name: &str, f: f32) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Float as i32,
        f,
        ..Default::default()
    }
}

fn string_attr(name: &str, s: &str) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::String as i32,
        s: Bytes::copy_from_slice(s.as_bytes()),
        ..Default::default()
    }
}

fn ints_attr(name: &str, ints: Vec<i64>) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Ints as i32,
        ints,
        ..Default::default()
    }
}

fn floats_attr(name: &str, floats: Vec<f32>) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Floats as i32,
        floats,
        ..Default::default()
    }
}

fn strings_attr(name: &str, strings: Vec<Bytes>) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Strings as i32,
        strings,
        ..Default::default()
    }
}

fn tensor_attr(name: &str, tensor: TensorProto) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Tensor as i32,
        t: Some(tensor),
        ..Default::default()
    }
}

fn tensors_attr(name: &str, tensors: Vec<TensorProto>) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: AttributeType::Tensors as i32,
        tensors,
        ..Default::default()
    }
}
