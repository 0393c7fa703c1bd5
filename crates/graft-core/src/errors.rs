//! Error types for the Graft importer.

use thiserror::Error;

use crate::types::NodeId;

/// Errors while turning vector geometry into an image.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Degenerate geometry: {reason}")]
    DegenerateGeometry { reason: String },

    #[error("Nothing to draw: no visible fill or stroke")]
    EmptyScene,

    #[error("Image would be {width}x{height} pixels")]
    ZeroSize { width: u32, height: u32 },

    #[error("Tessellation failed: {0}")]
    Tessellation(String),

    #[error("Image encoding failed: {0}")]
    Encode(String),
}

/// Errors raised during an import pass.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Cannot convert node {node}: {message}")]
    Convert { node: NodeId, message: String },

    #[error("Duplicate key '{key}' in {table} table")]
    DuplicateKey { table: &'static str, key: String },

    #[error("Rasterizing node {node} failed: {source}")]
    Raster {
        node: NodeId,
        #[source]
        source: RasterError,
    },

    #[error("Hook '{hook}' failed: {message}")]
    Hook { hook: String, message: String },
}

impl ImportError {
    pub fn convert(node: &NodeId, message: impl Into<String>) -> Self {
        ImportError::Convert {
            node: node.clone(),
            message: message.into(),
        }
    }

    /// Errors that abort a pass regardless of the error mode.
    ///
    /// A duplicate key in the generated-node table means the same node was
    /// converted twice, and the tree can no longer be trusted.
    pub fn is_structural(&self) -> bool {
        matches!(self, ImportError::DuplicateKey { table: "nodes", .. })
    }

    /// The node this error originated from, when known.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            ImportError::Convert { node, .. } | ImportError::Raster { node, .. } => Some(node),
            _ => None,
        }
    }
}

/// Result type alias for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_errors() {
        let dup_node = ImportError::DuplicateKey {
            table: "nodes",
            key: "1:1".into(),
        };
        let dup_asset = ImportError::DuplicateKey {
            table: "assets",
            key: "1:1".into(),
        };
        assert!(dup_node.is_structural());
        assert!(!dup_asset.is_structural());
        assert!(!ImportError::convert(&NodeId::from("1:1"), "bad").is_structural());
    }

    #[test]
    fn test_error_messages() {
        let err = ImportError::Raster {
            node: NodeId::from("4:2"),
            source: RasterError::ZeroSize {
                width: 0,
                height: 12,
            },
        };
        assert_eq!(
            err.to_string(),
            "Rasterizing node 4:2 failed: Image would be 0x12 pixels"
        );
        assert_eq!(err.node(), Some(&NodeId::from("4:2")));
    }
}
