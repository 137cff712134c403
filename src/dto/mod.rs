pub mod modeles;
pub mod motifs;

use base64::Engine;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Image selected during an editing session but not yet uploaded. The
/// browser's pending `File` travels as base64 inside the draft payload.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NouvelleImage {
    /// Original filename; only its extension survives into the object name
    pub file_name: String,
    /// Base64-encoded file content
    pub data_base64: String,
}

impl NouvelleImage {
    pub fn decode(&self) -> Result<Vec<u8>, ServiceError> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data_base64)
            .map_err(|e| ServiceError::InvalidInput(format!("invalid image data: {e}")))
    }
}
