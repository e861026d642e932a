//! Document library database operations.

use std::collections::HashSet;

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{Database, DbError, DbResult};
use crate::models::{AnalyzedDocument, DocumentLibrary};

impl Database {
    /// Insert a document, or replace the one with the same id in place.
    ///
    /// New documents sort first; a replaced document keeps its position.
    pub fn save_document(&self, doc: &AnalyzedDocument) -> DbResult<()> {
        let payload = serde_json::to_string(doc)?;

        self.conn.execute(
            r#"
            INSERT INTO documents (id, category, title, payload, analyzed_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                category = excluded.category,
                title = excluded.title,
                payload = excluded.payload,
                analyzed_at = excluded.analyzed_at,
                updated_at = datetime('now')
            "#,
            params![
                doc.id,
                doc.analysis.category.as_str(),
                doc.analysis.title,
                payload,
                doc.analyzed_at,
            ],
        )?;
        self.touch_library()?;

        debug!(id = %doc.id, category = %doc.analysis.category, "saved document");
        Ok(())
    }

    /// Delete a document by id.
    pub fn delete_document(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM documents WHERE id = ?", [id])?;
        self.touch_library()?;

        debug!(id = %id, deleted = rows_affected > 0, "delete document");
        Ok(rows_affected > 0)
    }

    /// Get a document by id.
    pub fn get_document(&self, id: &str) -> DbResult<Option<AnalyzedDocument>> {
        self.conn
            .query_row(
                "SELECT payload FROM documents WHERE id = ?",
                [id],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .map(|payload| serde_json::from_str(&payload).map_err(DbError::from))
            .transpose()
    }

    /// Get a document by id, failing when it does not exist.
    pub fn require_document(&self, id: &str) -> DbResult<AnalyzedDocument> {
        self.get_document(id)?
            .ok_or_else(|| DbError::NotFound(format!("document {}", id)))
    }

    /// All documents, newest first.
    pub fn list_documents(&self) -> DbResult<Vec<AnalyzedDocument>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM documents ORDER BY seq DESC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(serde_json::from_str(&row?)?);
        }
        Ok(documents)
    }

    /// The whole library with its last-updated timestamp.
    pub fn load_library(&self) -> DbResult<DocumentLibrary> {
        Ok(DocumentLibrary {
            documents: self.list_documents()?,
            last_updated: self.last_updated()?,
        })
    }

    /// Documents where every word of `query` appears in the searchable text.
    ///
    /// A blank query returns everything.
    pub fn search_documents(&self, query: &str) -> DbResult<Vec<AnalyzedDocument>> {
        let documents = self.list_documents()?;
        if query.trim().is_empty() {
            return Ok(documents);
        }
        Ok(documents
            .into_iter()
            .filter(|doc| doc.matches_query(query))
            .collect())
    }

    /// Documents in a category; `"all"` returns everything.
    pub fn documents_by_category(&self, category: &str) -> DbResult<Vec<AnalyzedDocument>> {
        if category == "all" {
            return self.list_documents();
        }

        let mut stmt = self.conn.prepare(
            "SELECT payload FROM documents WHERE category = ? ORDER BY seq DESC",
        )?;
        let rows = stmt.query_map([category], |row| row.get::<_, String>(0))?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(serde_json::from_str(&row?)?);
        }
        Ok(documents)
    }

    /// Timestamp of the last library write, empty when never written.
    pub fn last_updated(&self) -> DbResult<String> {
        Ok(self.conn.query_row(
            "SELECT last_updated FROM library_meta WHERE id = 1",
            [],
            |row| row.get(0),
        )?)
    }

    /// Export the library as JSON.
    pub fn export_library_json(&self) -> DbResult<String> {
        Ok(self.load_library()?.to_json()?)
    }

    /// Replace the whole library with the contents of a library JSON document.
    ///
    /// Returns the number of documents stored. When an id appears more than
    /// once, the first occurrence (the newest in library order) wins. Malformed
    /// JSON is rejected and leaves the current library untouched.
    pub fn import_library_json(&mut self, json: &str) -> DbResult<usize> {
        let library: DocumentLibrary = serde_json::from_str(json)?;

        let mut seen = HashSet::new();
        let unique: Vec<&AnalyzedDocument> = library
            .documents
            .iter()
            .filter(|doc| seen.insert(doc.id.as_str()))
            .collect();

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM documents", [])?;
        let mut stored = 0;
        // Oldest first so the first document ends up with the highest seq
        for doc in unique.iter().rev() {
            stored += tx.execute(
                r#"
                INSERT INTO documents (id, category, title, payload, analyzed_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    doc.id,
                    doc.analysis.category.as_str(),
                    doc.analysis.title,
                    serde_json::to_string(doc)?,
                    doc.analyzed_at,
                ],
            )?;
        }
        tx.execute(
            "UPDATE library_meta SET last_updated = ?1 WHERE id = 1",
            [chrono::Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;

        debug!(
            stored,
            duplicates = library.documents.len() - unique.len(),
            "imported document library"
        );
        Ok(stored)
    }

    fn touch_library(&self) -> DbResult<()> {
        self.conn.execute(
            "UPDATE library_meta SET last_updated = ?1 WHERE id = 1",
            [chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentAnalysis, DocumentCategory, FileInfo};

    fn make_document(title: &str, category: DocumentCategory) -> AnalyzedDocument {
        let analysis = DocumentAnalysis {
            category,
            title: title.into(),
            summary: format!("Summary of {}", title),
            ..Default::default()
        };
        AnalyzedDocument::new(
            analysis,
            FileInfo {
                file_name: format!("{}.jpg", title.to_lowercase().replace(' ', "_")),
                file_type: "image/jpeg".into(),
                file_size: 1024,
            },
        )
    }

    fn titles(docs: &[AnalyzedDocument]) -> Vec<&str> {
        docs.iter().map(|d| d.analysis.title.as_str()).collect()
    }

    #[test]
    fn test_save_and_get_document() {
        let db = Database::open_in_memory().unwrap();
        let doc = make_document("ER Visit", DocumentCategory::MedicalBill);

        db.save_document(&doc).unwrap();

        let retrieved = db.get_document(&doc.id).unwrap().unwrap();
        assert_eq!(retrieved, doc);
        assert!(db.get_document("doc_missing").unwrap().is_none());
    }

    #[test]
    fn test_new_documents_listed_first() {
        let db = Database::open_in_memory().unwrap();
        db.save_document(&make_document("First", DocumentCategory::Invoice)).unwrap();
        db.save_document(&make_document("Second", DocumentCategory::Receipt)).unwrap();
        db.save_document(&make_document("Third", DocumentCategory::Other)).unwrap();

        let docs = db.list_documents().unwrap();
        assert_eq!(titles(&docs), vec!["Third", "Second", "First"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let db = Database::open_in_memory().unwrap();
        let mut first = make_document("First", DocumentCategory::Invoice);
        db.save_document(&first).unwrap();
        db.save_document(&make_document("Second", DocumentCategory::Receipt)).unwrap();

        first.analysis.title = "First (edited)".into();
        db.save_document(&first).unwrap();

        let docs = db.list_documents().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(titles(&docs), vec!["Second", "First (edited)"]);
    }

    #[test]
    fn test_delete_document() {
        let db = Database::open_in_memory().unwrap();
        let doc = make_document("Lease", DocumentCategory::RealEstate);
        db.save_document(&doc).unwrap();

        assert!(db.delete_document(&doc.id).unwrap());
        assert!(!db.delete_document(&doc.id).unwrap());
        assert!(db.list_documents().unwrap().is_empty());
    }

    #[test]
    fn test_require_document_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.require_document("doc_nope"),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_last_updated_bumped_on_write() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.last_updated().unwrap(), "");

        let doc = make_document("Notice", DocumentCategory::LegalNotice);
        db.save_document(&doc).unwrap();
        assert!(!db.last_updated().unwrap().is_empty());

        let library = db.load_library().unwrap();
        assert_eq!(library.documents.len(), 1);
        assert_eq!(library.last_updated, db.last_updated().unwrap());
    }

    #[test]
    fn test_search_documents() {
        let db = Database::open_in_memory().unwrap();
        db.save_document(&make_document("Emergency Room Bill", DocumentCategory::MedicalBill))
            .unwrap();
        db.save_document(&make_document("Apartment Lease", DocumentCategory::RealEstate))
            .unwrap();

        assert_eq!(db.search_documents("  ").unwrap().len(), 2);
        assert_eq!(
            titles(&db.search_documents("emergency bill").unwrap()),
            vec!["Emergency Room Bill"]
        );
        assert_eq!(
            titles(&db.search_documents("REAL_ESTATE").unwrap()),
            vec!["Apartment Lease"]
        );
        assert!(db.search_documents("lease emergency").unwrap().is_empty());
    }

    #[test]
    fn test_documents_by_category() {
        let db = Database::open_in_memory().unwrap();
        db.save_document(&make_document("Bill A", DocumentCategory::MedicalBill)).unwrap();
        db.save_document(&make_document("W-2", DocumentCategory::TaxDocument)).unwrap();
        db.save_document(&make_document("Bill B", DocumentCategory::MedicalBill)).unwrap();

        assert_eq!(
            titles(&db.documents_by_category("medical_bill").unwrap()),
            vec!["Bill B", "Bill A"]
        );
        assert_eq!(db.documents_by_category("all").unwrap().len(), 3);
        assert!(db.documents_by_category("invoice").unwrap().is_empty());
    }

    #[test]
    fn test_export_import_round_trip() {
        let source = Database::open_in_memory().unwrap();
        source.save_document(&make_document("Old", DocumentCategory::Invoice)).unwrap();
        source.save_document(&make_document("New", DocumentCategory::Receipt)).unwrap();
        let json = source.export_library_json().unwrap();

        let mut target = Database::open_in_memory().unwrap();
        target.save_document(&make_document("Stale", DocumentCategory::Other)).unwrap();

        assert_eq!(target.import_library_json(&json).unwrap(), 2);
        assert_eq!(titles(&target.list_documents().unwrap()), vec!["New", "Old"]);
    }

    #[test]
    fn test_import_duplicate_ids_first_wins() {
        let newer = make_document("Newer", DocumentCategory::Invoice);
        let mut older = newer.clone();
        older.analysis.title = "Older".into();
        let other = make_document("Other", DocumentCategory::Receipt);

        let library = DocumentLibrary {
            documents: vec![newer.clone(), other, older],
            last_updated: String::new(),
        };
        let json = library.to_json().unwrap();

        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.import_library_json(&json).unwrap(), 2);

        let docs = db.list_documents().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(titles(&docs), vec!["Newer", "Other"]);
        assert_eq!(db.get_document(&newer.id).unwrap().unwrap().analysis.title, "Newer");
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_document(&make_document("Keep", DocumentCategory::Other)).unwrap();

        assert!(matches!(
            db.import_library_json("{broken"),
            Err(DbError::Json(_))
        ));
        assert_eq!(db.list_documents().unwrap().len(), 1);
    }
}
