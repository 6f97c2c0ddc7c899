//! Document store seam used by the deduplication gate.

use dashmap::DashMap;
use serde::Serialize;

/// Projection of an already-stored document, returned on a fingerprint match.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRef {
    pub id: String,
    pub filename: String,
}

/// Narrow interface onto wherever documents actually live. The service asks
/// one question of it (per-user fingerprint lookup) and records one fact
/// (a processed document now owns a fingerprint).
pub trait DocumentStore: Send + Sync {
    /// Dedup lookup keyed by `(owner_user_id, content_hash)`. Fingerprints
    /// are scoped per user: identical bytes owned by two users never match.
    fn fetch_document_by_hash(
        &self,
        owner_user_id: i64,
        content_hash: &str,
    ) -> Option<DocumentRef>;

    /// Record that `document` owns `content_hash` for this user. Replacing a
    /// document re-records under the same key.
    fn record_document(&self, owner_user_id: i64, content_hash: &str, document: DocumentRef);
}

/// In-process store. Durable persistence is out of scope for this service;
/// deployments wanting it implement [`DocumentStore`] over their database.
#[derive(Default)]
pub struct MemoryStore {
    by_owner_hash: DashMap<(i64, String), DocumentRef>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn fetch_document_by_hash(
        &self,
        owner_user_id: i64,
        content_hash: &str,
    ) -> Option<DocumentRef> {
        self.by_owner_hash
            .get(&(owner_user_id, content_hash.to_string()))
            .map(|entry| entry.value().clone())
    }

    fn record_document(&self, owner_user_id: i64, content_hash: &str, document: DocumentRef) {
        self.by_owner_hash
            .insert((owner_user_id, content_hash.to_string()), document);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_scoped_per_user() {
        let store = MemoryStore::new();
        store.record_document(
            1,
            "abc123",
            DocumentRef {
                id: "doc-1".to_string(),
                filename: "report.pdf".to_string(),
            },
        );

        let hit = store.fetch_document_by_hash(1, "abc123").unwrap();
        assert_eq!(hit.id, "doc-1");
        assert_eq!(hit.filename, "report.pdf");

        // Same fingerprint, different owner: no match
        assert!(store.fetch_document_by_hash(2, "abc123").is_none());
        assert!(store.fetch_document_by_hash(1, "other").is_none());
    }

    #[test]
    fn re_recording_overwrites_the_owner() {
        let store = MemoryStore::new();
        store.record_document(
            1,
            "abc123",
            DocumentRef {
                id: "doc-1".to_string(),
                filename: "v1.pdf".to_string(),
            },
        );
        store.record_document(
            1,
            "abc123",
            DocumentRef {
                id: "doc-1".to_string(),
                filename: "v2.pdf".to_string(),
            },
        );

        assert_eq!(
            store.fetch_document_by_hash(1, "abc123").unwrap().filename,
            "v2.pdf"
        );
    }
}
