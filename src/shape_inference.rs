//! Best-known output shapes: override table first, then whatever static
//! shape metadata the source graph carries.

use std::collections::HashMap;

use crate::error::GraphError;
use crate::graph::{AttrValue, GraphNode, NodeOutput};

/// Resolve the best-known shape for one node output.
///
/// An entry in the override table wins unconditionally (it injects
/// runtime-known shapes the static graph does not carry); otherwise the
/// output's own static shape is used; otherwise the shape is unknown.
pub fn resolve_output_shape(
    output: &NodeOutput,
    shape_override: &HashMap<String, Vec<i64>>,
) -> Option<Vec<i64>> {
    shape_override
        .get(&output.name)
        .cloned()
        .or_else(|| output.shape.clone())
}

/// Dimension list declared by a node's `"shape"` attribute.
///
/// Returns `None` when the attribute is absent, reports unknown rank, or is
/// malformed. Shape is advisory metadata, so a malformed attribute is
/// downgraded to unknown here rather than aborting the conversion; only
/// shape-format failures are caught, anything else would propagate.
pub fn shape_attr_dims(node: &GraphNode) -> Option<Vec<i64>> {
    match declared_shape(node) {
        Ok(dims) => dims,
        Err(GraphError::MalformedShape { name, reason }) => {
            log::debug!("ignoring malformed shape on {}: {}", name, reason);
            None
        }
        Err(_) => unreachable!("declared_shape only fails with MalformedShape"),
    }
}

fn declared_shape(node: &GraphNode) -> Result<Option<Vec<i64>>, GraphError> {
    match node.attr("shape") {
        None => Ok(None),
        Some(AttrValue::Shape(shape)) => {
            if shape.unknown_rank {
                Ok(None)
            } else {
                Ok(Some(shape.dims.clone()))
            }
        }
        Some(other) => Err(GraphError::MalformedShape {
            name: node.name.clone(),
            reason: format!("expected a shape attribute, found {:?}", other),
        }),
    }
}
