//! Stored documents and the document library.

use serde::{Deserialize, Serialize};

use super::analysis::DocumentAnalysis;

/// Metadata about the uploaded file, supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub file_name: String,
    /// MIME type, e.g. "image/jpeg"
    pub file_type: String,
    /// Size in bytes
    pub file_size: u64,
}

/// An analysis together with the identity and file metadata the caller attaches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedDocument {
    pub id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    /// RFC 3339 upload timestamp
    pub uploaded_at: String,
    /// RFC 3339 analysis timestamp
    pub analyzed_at: String,
    #[serde(flatten)]
    pub analysis: DocumentAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_data: Option<String>,
}

impl AnalyzedDocument {
    /// Wrap a fresh analysis with a new id and timestamps.
    pub fn new(analysis: DocumentAnalysis, file: FileInfo) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: generate_document_id(),
            file_name: file.file_name,
            file_type: file.file_type,
            file_size: file.file_size,
            uploaded_at: now.clone(),
            analyzed_at: now,
            analysis,
            thumbnail_data: None,
        }
    }

    /// Search text including the file name.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {}",
            self.analysis.searchable_text(),
            self.file_name.to_lowercase()
        )
    }

    /// Whether every whitespace-separated word of `query` occurs in the search text.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let text = self.searchable_text();
        query.split_whitespace().all(|word| text.contains(word))
    }
}

/// Generate a document id of the form `doc_<unix millis>_<6 chars>`.
pub fn generate_document_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("doc_{}_{}", millis, &suffix[..6])
}

/// The full document collection, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLibrary {
    pub documents: Vec<AnalyzedDocument>,
    pub last_updated: String,
}

impl DocumentLibrary {
    /// Parse a library, falling back to an empty one on malformed input.
    pub fn from_json_lenient(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(library) => library,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable document library");
                Self {
                    documents: Vec::new(),
                    last_updated: chrono::Utc::now().to_rfc3339(),
                }
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn find(&self, id: &str) -> Option<&AnalyzedDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }
}
