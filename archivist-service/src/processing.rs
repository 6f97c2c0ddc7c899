//! Processing seam: the heavy per-document work the coordinator dispatches.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ProcessingError;
use crate::store::{DocumentRef, DocumentStore};

/// Arguments handed to a processing backend for one staged upload.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub file_path: PathBuf,
    pub filename: String,
    pub owner_user_id: i64,
    pub content_hash: String,
    /// Present when the caller is replacing an existing document.
    pub document_id: Option<String>,
}

/// Result payload of a completed processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub document_id: String,
    pub text_chunks: usize,
    pub image_chunks: usize,
}

/// A document processing backend. Implementations run on blocking worker
/// threads and may take seconds to minutes per document.
pub trait ProcessDocument: Send + Sync {
    fn process(&self, request: &ProcessRequest) -> Result<ProcessOutcome, ProcessingError>;
}

/// Backend that files the staged upload into the documents directory and
/// records its fingerprint in the store, without extracting content. Chunk
/// extraction lives behind the same trait in backends that do it.
pub struct ArchiveProcessor {
    store: Arc<dyn DocumentStore>,
    documents_dir: PathBuf,
}

impl ArchiveProcessor {
    pub fn new(store: Arc<dyn DocumentStore>, documents_dir: PathBuf) -> Self {
        Self {
            store,
            documents_dir,
        }
    }
}

impl ProcessDocument for ArchiveProcessor {
    fn process(&self, request: &ProcessRequest) -> Result<ProcessOutcome, ProcessingError> {
        let document_id = request
            .document_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let permanent_path = self
            .documents_dir
            .join(format!("{}_{}", document_id, request.filename));
        std::fs::rename(&request.file_path, &permanent_path)?;

        self.store.record_document(
            request.owner_user_id,
            &request.content_hash,
            DocumentRef {
                id: document_id.clone(),
                filename: request.filename.clone(),
            },
        );

        info!(
            document_id = %document_id,
            filename = %request.filename,
            "Document archived"
        );

        Ok(ProcessOutcome {
            document_id,
            text_chunks: 0,
            image_chunks: 0,
        })
    }
}
