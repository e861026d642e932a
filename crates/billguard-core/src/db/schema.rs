//! SQLite schema definition.

/// Complete database schema for the document library.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Documents
-- ============================================================================

CREATE TABLE IF NOT EXISTS documents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,        -- insertion order, kept on replace
    id TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL DEFAULT 'other',
    title TEXT NOT NULL DEFAULT '',
    payload TEXT NOT NULL,                        -- JSON AnalyzedDocument
    analyzed_at TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_documents_category ON documents(category);

-- ============================================================================
-- Library State (single row)
-- ============================================================================

CREATE TABLE IF NOT EXISTS library_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    last_updated TEXT NOT NULL DEFAULT ''
);

INSERT OR IGNORE INTO library_meta (id, last_updated) VALUES (1, '');
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM library_meta", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_single_meta_row_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO library_meta (id, last_updated) VALUES (2, 'x')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_document_id_unique() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let insert = "INSERT INTO documents (id, payload, analyzed_at) VALUES ('doc_1', '{}', 'now')";
        assert!(conn.execute(insert, []).is_ok());
        assert!(conn.execute(insert, []).is_err());
    }
}
