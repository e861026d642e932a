//! BillGuard Core Library
//!
//! Local-first document analysis: model replies in, readable reports out.
//!
//! # Architecture
//!
//! ```text
//! Photo → Hosted vision model → raw reply text
//!                                     │
//!                          ┌──────────▼──────────┐
//!                          │  Response Normalizer │
//!                          │  strip fences        │
//!                          │  parse JSON          │
//!                          │  default every field │
//!                          └──────────┬──────────┘
//!                                     │
//!                              DocumentAnalysis
//!                                     │
//!                 ┌───────────────────┼───────────────────┐
//!                 │                   │                   │
//!                 ▼                   ▼                   ▼
//!          Document Library      Text Report       Dispute Letter
//!              (SQLite)                          (flagged charges)
//! ```
//!
//! # Core Principle
//!
//! **A reply that parses as a JSON object always yields a usable record.**
//! Only unparseable text and an explicit model rejection are errors.
//!
//! # Modules
//!
//! - [`normalizer`]: Response normalizer (fence stripping, coercion, defaults)
//! - [`models`]: Domain types (DocumentAnalysis, AnalyzedDocument, etc.)
//! - [`db`]: SQLite document library
//! - [`export`]: Text report and dispute letter

pub mod db;
pub mod export;
pub mod models;
pub mod normalizer;

// Re-export commonly used types
pub use db::Database;
pub use export::{render_report, DisputeLetter, DisputeRequest};
pub use models::{
    AnalyzedDocument, DocumentAnalysis, DocumentCategory, DocumentLibrary, FileInfo,
    MedicalBillData,
};
pub use normalizer::{normalize, NormalizationError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum BillGuardError {
    #[error("{0}")]
    Unparseable(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<NormalizationError> for BillGuardError {
    fn from(e: NormalizationError) -> Self {
        match e {
            NormalizationError::Unparseable { .. } => BillGuardError::Unparseable(e.user_message()),
            NormalizationError::UpstreamRejected(message) => BillGuardError::Rejected(message),
        }
    }
}

impl From<db::DbError> for BillGuardError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => BillGuardError::NotFound(what),
            other => BillGuardError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for BillGuardError {
    fn from(e: serde_json::Error) -> Self {
        BillGuardError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for BillGuardError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        BillGuardError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a document library at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<BillGuardCore>, BillGuardError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(BillGuardCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory document library (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<BillGuardCore>, BillGuardError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(BillGuardCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Normalize a raw model reply without storing it. Returns the analysis as JSON.
#[uniffi::export]
pub fn normalize_response_json(raw_text: String) -> Result<String, BillGuardError> {
    let analysis = normalize(&raw_text)?;
    Ok(serde_json::to_string(&analysis)?)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe library wrapper for FFI.
#[derive(uniffi::Object)]
pub struct BillGuardCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl BillGuardCore {
    // =========================================================================
    // Analysis
    // =========================================================================

    /// Normalize a model reply, attach file metadata and save it to the library.
    pub fn analyze_response(
        &self,
        raw_text: String,
        file: FfiFileInfo,
    ) -> Result<FfiDocumentSummary, BillGuardError> {
        let analysis = normalize(&raw_text)?;
        let doc = AnalyzedDocument::new(analysis, file.into());

        let db = self.db.lock()?;
        db.save_document(&doc)?;
        Ok((&doc).into())
    }

    // =========================================================================
    // Library Operations
    // =========================================================================

    /// Get a stored document as JSON.
    pub fn get_document_json(&self, id: String) -> Result<Option<String>, BillGuardError> {
        let db = self.db.lock()?;
        let doc = db.get_document(&id)?;
        Ok(doc.map(|d| serde_json::to_string(&d)).transpose()?)
    }

    /// Insert or replace a document given as JSON.
    pub fn save_document_json(&self, json: String) -> Result<(), BillGuardError> {
        let doc: AnalyzedDocument = serde_json::from_str(&json)?;
        let db = self.db.lock()?;
        db.save_document(&doc)?;
        Ok(())
    }

    /// All documents, newest first.
    pub fn list_documents(&self) -> Result<Vec<FfiDocumentSummary>, BillGuardError> {
        let db = self.db.lock()?;
        let docs = db.list_documents()?;
        Ok(docs.iter().map(|d| d.into()).collect())
    }

    /// Search documents by words in any text field.
    pub fn search_documents(
        &self,
        query: String,
    ) -> Result<Vec<FfiDocumentSummary>, BillGuardError> {
        let db = self.db.lock()?;
        let docs = db.search_documents(&query)?;
        Ok(docs.iter().map(|d| d.into()).collect())
    }

    /// Documents in a category (`"all"` for everything).
    pub fn documents_by_category(
        &self,
        category: String,
    ) -> Result<Vec<FfiDocumentSummary>, BillGuardError> {
        let db = self.db.lock()?;
        let docs = db.documents_by_category(&category)?;
        Ok(docs.iter().map(|d| d.into()).collect())
    }

    /// Delete a document. Returns false when it did not exist.
    pub fn delete_document(&self, id: String) -> Result<bool, BillGuardError> {
        let db = self.db.lock()?;
        Ok(db.delete_document(&id)?)
    }

    /// Export the whole library as JSON.
    pub fn export_library_json(&self) -> Result<String, BillGuardError> {
        let db = self.db.lock()?;
        Ok(db.export_library_json()?)
    }

    /// Replace the library with an exported one. Returns the document count.
    pub fn import_library_json(&self, json: String) -> Result<u32, BillGuardError> {
        let mut db = self.db.lock()?;
        let count = db.import_library_json(&json)?;
        Ok(count as u32)
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Render a stored document as a plain-text report.
    pub fn render_report(&self, id: String) -> Result<FfiExportFile, BillGuardError> {
        let db = self.db.lock()?;
        let doc = db.require_document(&id)?;
        Ok(FfiExportFile {
            file_name: export::report_file_name(&doc.analysis.title),
            content: render_report(&doc),
        })
    }

    /// Generate a dispute letter for the flagged charges of a stored bill.
    ///
    /// Returns `None` when nothing on the bill is flagged.
    pub fn generate_dispute_letter(
        &self,
        id: String,
        patient_name: Option<String>,
        account_number: Option<String>,
    ) -> Result<Option<FfiExportFile>, BillGuardError> {
        let db = self.db.lock()?;
        let doc = db.require_document(&id)?;
        let request = DisputeRequest {
            patient_name,
            account_number,
        };
        Ok(
            DisputeLetter::generate(&doc.analysis, &request).map(|letter| FfiExportFile {
                file_name: letter.file_name(),
                content: letter.text,
            }),
        )
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe uploaded file metadata.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFileInfo {
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
}

impl From<FfiFileInfo> for FileInfo {
    fn from(file: FfiFileInfo) -> Self {
        FileInfo {
            file_name: file.file_name,
            file_type: file.file_type,
            file_size: file.file_size,
        }
    }
}

/// FFI-safe document card for library listings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDocumentSummary {
    pub id: String,
    pub file_name: String,
    pub title: String,
    pub category: String,
    pub subcategory: String,
    pub summary: String,
    pub confidence: String,
    pub analyzed_at: String,
    pub risk_flag_count: u32,
    pub overcharge_count: u32,
    pub total_savings: Option<f64>,
}

impl From<&AnalyzedDocument> for FfiDocumentSummary {
    fn from(doc: &AnalyzedDocument) -> Self {
        let analysis = &doc.analysis;
        Self {
            id: doc.id.clone(),
            file_name: doc.file_name.clone(),
            title: analysis.title.clone(),
            category: analysis.category.to_string(),
            subcategory: analysis.subcategory.clone(),
            summary: analysis.summary.clone(),
            confidence: analysis.confidence.to_string(),
            analyzed_at: doc.analyzed_at.clone(),
            risk_flag_count: analysis.risk_flags.len() as u32,
            overcharge_count: analysis.overcharge_count() as u32,
            total_savings: analysis.medical_bill_data.as_ref().map(|b| b.total_savings),
        }
    }
}

/// FFI-safe text file ready to be saved or shared.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExportFile {
    pub file_name: String,
    pub content: String,
}
