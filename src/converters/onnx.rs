//! Node-by-node conversion of a source graph into ONNX.
//!
//! The pass is deliberately minimal: node names, operator tags, and
//! input/output orderings are carried over unchanged so that per-operator
//! rewriting can happen downstream on the ONNX form.

use std::collections::HashMap;

use prost::Message;

use super::{ConvertedGraph, GraphConverter};
use crate::attr::resolve_node_attrs;
use crate::dtype::map_dtype;
use crate::error::GraphError;
use crate::graph::GraphInfo;
use crate::protos::onnx::tensor_proto::DataType as OnnxDataType;
use crate::protos::onnx::{
    tensor_shape_proto, type_proto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto,
    TensorShapeProto, TypeProto, ValueInfoProto,
};
use crate::shape_inference::resolve_output_shape;

/// Everything one conversion pass produces: the flat ONNX node list plus
/// per-output metadata tables and per-pass frequency counters.
///
/// Built fresh for every call and never mutated after the pass returns.
/// Every output port referenced by an emitted node has an entry in both
/// tables, even when the value is unknown.
#[derive(Debug, Default)]
pub struct GraphConversion {
    pub nodes: Vec<NodeProto>,
    /// Best-known shape per output port; `None` means unknown.
    pub output_shapes: HashMap<String, Option<Vec<i64>>>,
    /// ONNX type per output port, plus per-node hints keyed by node name.
    pub dtypes: HashMap<String, Option<OnnxDataType>>,
    pub op_counts: HashMap<String, usize>,
    pub attr_counts: HashMap<String, usize>,
}

/// Converter from the source IR to ONNX.
#[derive(Default)]
pub struct OnnxConverter;

impl OnnxConverter {
    pub fn new() -> Self {
        OnnxConverter
    }

    /// Convert the node list in one pass.
    ///
    /// Output metadata is recorded for every node before any attribute is
    /// resolved. A failure while assembling a single node aborts the whole
    /// pass; a partial graph is not safe to return.
    pub fn convert_nodes(
        &self,
        graph: &GraphInfo,
        shape_override: &HashMap<String, Vec<i64>>,
    ) -> Result<GraphConversion, GraphError> {
        let mut conversion = GraphConversion::default();

        // Pass 1: per-output dtype and shape tables.
        for node in &graph.nodes {
            for output in &node.outputs {
                conversion
                    .dtypes
                    .insert(output.name.clone(), map_dtype(output.dtype)?);
                conversion
                    .output_shapes
                    .insert(output.name.clone(), resolve_output_shape(output, shape_override));
            }
        }

        // Pass 2: attribute resolution and node emission, in graph order.
        for node in &graph.nodes {
            *conversion
                .op_counts
                .entry(node.op_type.clone())
                .or_insert(0) += 1;

            let attribute = resolve_node_attrs(
                node,
                &mut conversion.dtypes,
                &mut conversion.attr_counts,
            )
            .map_err(|err| {
                log::error!("conversion failed for node {}: {}", node.name, err);
                GraphError::NodeConversion {
                    node: node.name.clone(),
                    source: Box::new(err),
                }
            })?;

            conversion.nodes.push(NodeProto {
                input: node.inputs.clone(),
                output: node.outputs.iter().map(|o| o.name.clone()).collect(),
                name: node.name.clone(),
                op_type: node.op_type.clone(),
                attribute,
                ..Default::default()
            });
        }

        log::debug!(
            "converted {} nodes across {} op types and {} attribute names",
            conversion.nodes.len(),
            conversion.op_counts.len(),
            conversion.attr_counts.len()
        );

        Ok(conversion)
    }

    /// Assemble a full model around a finished conversion, typing the graph
    /// boundary from the conversion's dtype/shape tables.
    pub fn build_model(&self, graph: &GraphInfo, conversion: &GraphConversion) -> ModelProto {
        let input = graph
            .inputs
            .iter()
            .map(|name| value_info(name, conversion))
            .collect();
        let output = graph
            .outputs
            .iter()
            .map(|name| value_info(name, conversion))
            .collect();

        ModelProto {
            ir_version: 8,
            producer_name: env!("CARGO_PKG_NAME").to_string(),
            producer_version: env!("CARGO_PKG_VERSION").to_string(),
            graph: Some(GraphProto {
                name: "converted_graph".to_string(),
                node: conversion.nodes.clone(),
                input,
                output,
                ..Default::default()
            }),
            opset_import: vec![OperatorSetIdProto {
                version: 13,
                ..Default::default()
            }],
            ..Default::default()
        }
    }
}

impl GraphConverter for OnnxConverter {
    fn format(&self) -> &'static str {
        "onnx"
    }

    fn convert(&self, graph: &GraphInfo) -> Result<ConvertedGraph, GraphError> {
        let conversion = self.convert_nodes(graph, &HashMap::new())?;
        let model = self.build_model(graph, &conversion);

        Ok(ConvertedGraph {
            format: "onnx",
            content_type: "application/onnx",
            data: model.encode_to_vec(),
        })
    }
}

fn value_info(name: &str, conversion: &GraphConversion) -> ValueInfoProto {
    let elem_type = conversion
        .dtypes
        .get(name)
        .copied()
        .flatten()
        .map(|d| d as i32)
        .unwrap_or(OnnxDataType::Undefined as i32);

    // An unknown dimension becomes a dimension with no value.
    let shape = conversion
        .output_shapes
        .get(name)
        .cloned()
        .flatten()
        .map(|dims| TensorShapeProto {
            dim: dims
                .iter()
                .map(|d| tensor_shape_proto::Dimension {
                    value: if *d < 0 {
                        None
                    } else {
                        Some(tensor_shape_proto::dimension::Value::DimValue(*d))
                    },
                    ..Default::default()
                })
                .collect(),
        });

    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type,
                shape,
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}
