//! Hand-off to the external graph-transform pipeline.
//!
//! Constant folding and batch-norm folding are not reimplemented here; the
//! pipeline is an opaque collaborator invoked once, synchronously, with a
//! fixed list of transform names. This module only restricts the graph to
//! the dependency closure of the requested endpoints before handing it off.

use std::collections::HashSet;

use crate::error::GraphError;
use crate::graph::{node_name, GraphInfo};

pub const TRANSFORM_FOLD_CONSTANTS: &str = "fold_constants(ignore_errors=true)";
/// Removes node colocation attributes left behind by constant folding.
pub const TRANSFORM_REMOVE_COLOCATION: &str = "remove_attribute(attribute_name=_class)";
pub const TRANSFORM_FOLD_BATCH_NORMS: &str = "fold_batch_norms";
pub const TRANSFORM_FOLD_OLD_BATCH_NORMS: &str = "fold_old_batch_norms";

/// External graph-transform pipeline.
pub trait GraphTransform {
    fn transform(
        &self,
        graph: &GraphInfo,
        inputs: &[String],
        outputs: &[String],
        transforms: &[String],
    ) -> Result<GraphInfo, GraphError>;
}

/// No-op pipeline for hosts without an optimizer.
pub struct PassthroughTransform;

impl GraphTransform for PassthroughTransform {
    fn transform(
        &self,
        graph: &GraphInfo,
        _inputs: &[String],
        _outputs: &[String],
        _transforms: &[String],
    ) -> Result<GraphInfo, GraphError> {
        Ok(graph.clone())
    }
}

/// Prepare a graph for conversion.
///
/// The graph is restricted to the dependency closure of the requested
/// input/output endpoints, then run through the transform pipeline. The
/// batch-norm folds always run; `fold_constants` additionally enables the
/// constant-folding step and its colocation-attribute cleanup.
pub fn optimize_graph(
    transform: &dyn GraphTransform,
    inputs: &[String],
    outputs: &[String],
    graph: &GraphInfo,
    fold_constants: bool,
) -> Result<GraphInfo, GraphError> {
    let mut transforms = Vec::new();
    if fold_constants {
        transforms.push(TRANSFORM_FOLD_CONSTANTS.to_string());
        transforms.push(TRANSFORM_REMOVE_COLOCATION.to_string());
    }
    transforms.push(TRANSFORM_FOLD_BATCH_NORMS.to_string());
    transforms.push(TRANSFORM_FOLD_OLD_BATCH_NORMS.to_string());

    let needed: Vec<String> = inputs
        .iter()
        .chain(outputs.iter())
        .map(|name| node_name(name).to_string())
        .collect();
    let restricted = extract_sub_graph(graph, &needed)?;

    transform.transform(&restricted, inputs, outputs, &transforms)
}

/// Restrict a graph to the dependency closure of the given node names.
///
/// Node order is preserved. Port suffixes and control-dependency markers on
/// edges are stripped while walking; a referenced node that is not in the
/// graph is an error.
pub fn extract_sub_graph(graph: &GraphInfo, dest_nodes: &[String]) -> Result<GraphInfo, GraphError> {
    let mut keep: HashSet<String> = HashSet::new();
    let mut pending: Vec<String> = dest_nodes.to_vec();

    while let Some(name) = pending.pop() {
        if !keep.insert(name.clone()) {
            continue;
        }
        let node = graph
            .node(&name)
            .ok_or_else(|| GraphError::MissingNode { name: name.clone() })?;
        for input in &node.inputs {
            let input_node = node_name(input);
            if !keep.contains(input_node) {
                pending.push(input_node.to_string());
            }
        }
    }

    let nodes = graph
        .nodes
        .iter()
        .filter(|n| keep.contains(&n.name))
        .cloned()
        .collect();

    Ok(GraphInfo {
        nodes,
        inputs: graph.inputs.clone(),
        outputs: graph.outputs.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphNode;
    use std::collections::BTreeMap;

    fn node(name: &str, inputs: Vec<&str>) -> GraphNode {
        GraphNode {
            name: name.to_string(),
            op_type: "Test".to_string(),
            inputs: inputs.into_iter().map(str::to_string).collect(),
            outputs: vec![],
            attrs: BTreeMap::new(),
        }
    }

    fn chain_graph() -> GraphInfo {
        // a -> b -> y, with z dangling off on its own.
        GraphInfo {
            nodes: vec![
                node("a", vec![]),
                node("b", vec!["a:0"]),
                node("y", vec!["b:0"]),
                node("z", vec![]),
            ],
            inputs: vec!["a:0".to_string()],
            outputs: vec!["y:0".to_string()],
        }
    }

    #[test]
    fn test_closure_excludes_unrelated_nodes() {
        let graph = chain_graph();
        let sub = extract_sub_graph(&graph, &["y".to_string()]).unwrap();
        let names: Vec<&str> = sub.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "y"]);
    }

    #[test]
    fn test_closure_strips_control_markers() {
        let graph = GraphInfo {
            nodes: vec![node("init", vec![]), node("y", vec!["^init"])],
            inputs: vec![],
            outputs: vec![],
        };
        let sub = extract_sub_graph(&graph, &["y".to_string()]).unwrap();
        assert_eq!(sub.nodes.len(), 2);
    }

    #[test]
    fn test_missing_node_fails() {
        let graph = chain_graph();
        assert!(matches!(
            extract_sub_graph(&graph, &["nope".to_string()]),
            Err(GraphError::MissingNode { .. })
        ));
    }

    #[test]
    fn test_optimize_keeps_graph_endpoints() {
        let graph = chain_graph();
        let optimized = optimize_graph(
            &PassthroughTransform,
            &["a:0".to_string()],
            &["y:0".to_string()],
            &graph,
            true,
        )
        .unwrap();
        assert!(optimized.node("y").is_some());
        assert!(optimized.node("z").is_none());
    }
}
