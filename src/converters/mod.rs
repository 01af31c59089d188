use std::collections::HashMap;

use crate::error::GraphError;
use crate::graph::GraphInfo;

pub mod onnx;

pub use onnx::{GraphConversion, OnnxConverter};

/// An encoded, ready-to-ship target graph.
pub struct ConvertedGraph {
    pub format: &'static str,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

pub trait GraphConverter {
    fn format(&self) -> &'static str;
    fn convert(&self, graph: &GraphInfo) -> Result<ConvertedGraph, GraphError>;
}

/// Converters looked up by format name.
pub struct ConverterRegistry {
    converters: HashMap<&'static str, Box<dyn GraphConverter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        let mut converters: HashMap<&'static str, Box<dyn GraphConverter>> = HashMap::new();
        let onnx = OnnxConverter::new();
        converters.insert(onnx.format(), Box::new(onnx));
        Self { converters }
    }

    pub fn get(&self, format: &str) -> Option<&dyn GraphConverter> {
        self.converters.get(format).map(|c| c.as_ref())
    }

    pub fn formats(&self) -> Vec<&'static str> {
        self.converters.keys().copied().collect()
    }

    pub fn convert(&self, format: &str, graph: &GraphInfo) -> Result<ConvertedGraph, GraphError> {
        match self.get(format) {
            Some(converter) => converter.convert(graph),
            None => Err(GraphError::UnknownFormat {
                format: format.to_string(),
            }),
        }
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
