use std::fs;
use std::path::Path;

use crate::error::GraphError;
use crate::graph::GraphInfo;

/// Load a source graph from a JSON file.
pub fn load_graph_from_path(path: &Path) -> Result<GraphInfo, GraphError> {
    let data = fs::read_to_string(path).map_err(|e| GraphError::Load {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&data).map_err(|e| GraphError::Load {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_round_trip() {
        let json = r#"{
            "nodes": [
                {
                    "name": "x",
                    "type": "Placeholder",
                    "outputs": [{"name": "x:0", "dtype": "float", "shape": [1, 3]}],
                    "attrs": {"dtype": {"type": "float"}}
                }
            ],
            "inputs": ["x:0"],
            "outputs": ["x:0"]
        }"#;
        let path = std::env::temp_dir().join("tfonnx_loader_test.json");
        fs::write(&path, json).unwrap();

        let graph = load_graph_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].op_type, "Placeholder");
        assert_eq!(graph.inputs, vec!["x:0"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_graph_from_path(Path::new("/nonexistent/graph.json")).unwrap_err();
        assert!(matches!(err, GraphError::Load { .. }));
    }
}
