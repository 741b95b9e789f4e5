use thiserror::Error;

/// Coarse classification of a [`VertexError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    /// Malformed or inconsistent request data
    InvalidData,
    /// Hub registry or selection settings are inconsistent
    Configuration,
}

/// Errors raised while projecting or selecting vertices.
///
/// Every data error names the vertex and/or branch it was detected on so the
/// caller can decide whether to fail the whole run or only skip the request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VertexError {
    #[error("Vertex {vertex_id}: missing coordinate for hub '{coordinate_key}'")]
    MissingCoordinate {
        vertex_id: u32,
        coordinate_key: String,
    },

    #[error("Vertex {vertex_id}: cannot parse coordinate '{raw}' for hub '{coordinate_key}'")]
    UnparsableCoordinate {
        vertex_id: u32,
        coordinate_key: String,
        raw: String,
    },

    #[error("Vertex {vertex_id}: unexpected coordinate '{coordinate_key}' not declared in hub registry")]
    UnexpectedCoordinate {
        vertex_id: u32,
        coordinate_key: String,
    },

    #[error("Vertex {vertex_id}: missing coordinate '{coordinate_key}' required by branch '{branch_id}'")]
    MissingBranchCoordinate {
        vertex_id: u32,
        branch_id: String,
        coordinate_key: String,
    },

    #[error("No reference net position for area '{area_code}' (vertex {vertex_id})")]
    MissingReferencePosition { vertex_id: u32, area_code: String },

    #[error("Vertex {vertex_id}: arithmetic overflow on branch '{branch_id}'")]
    Overflow { vertex_id: u32, branch_id: String },

    #[error("Branch '{branch_id}': flow-based code '{flow_based_code}' is unknown to the hub registry")]
    UnknownFlowBasedCode {
        branch_id: String,
        flow_based_code: String,
    },

    #[error("Invalid hub registry: {0}")]
    InvalidRegistry(String),

    #[error("Invalid selection settings: {0}")]
    InvalidSelection(String),
}

impl VertexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VertexError::MissingCoordinate { .. }
            | VertexError::UnparsableCoordinate { .. }
            | VertexError::UnexpectedCoordinate { .. }
            | VertexError::MissingBranchCoordinate { .. }
            | VertexError::MissingReferencePosition { .. }
            | VertexError::Overflow { .. } => ErrorKind::InvalidData,
            VertexError::UnknownFlowBasedCode { .. }
            | VertexError::InvalidRegistry(_)
            | VertexError::InvalidSelection(_) => ErrorKind::Configuration,
        }
    }

    /// HTTP-like status reported to the calling service
    pub fn status(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidData => 400,
            ErrorKind::Configuration => 500,
        }
    }

    /// Stable error code, e.g. `400-InvalidDataException`
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidData => "400-InvalidDataException",
            ErrorKind::Configuration => "500-ConfigurationException",
        }
    }
}

impl From<validator::ValidationErrors> for VertexError {
    fn from(errors: validator::ValidationErrors) -> Self {
        VertexError::InvalidSelection(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VertexError>;
