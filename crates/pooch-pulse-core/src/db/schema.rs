//! SQLite schema definition.

/// Complete database schema for PoochPulse.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Application State (whole-collection documents)
-- ============================================================================

CREATE TABLE IF NOT EXISTS app_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                         -- JSON document or plain string
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Serialized report collection, most recent first.
pub const REPORTS_KEY: &str = "pooch_reports_v2";
/// Serialized dog profile collection.
pub const DOGS_KEY: &str = "pooch_dogs_v2";
/// ID of the active dog profile.
pub const ACTIVE_DOG_KEY: &str = "pooch_active_dog_id";
/// Optional provider proxy address.
pub const PROXY_URL_KEY: &str = "pooch_proxy_url";

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
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_key_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO app_state (key, value) VALUES (?, ?)",
            [DOGS_KEY, "[]"],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO app_state (key, value) VALUES (?, ?)",
            [DOGS_KEY, "[]"],
        );
        assert!(result.is_err());
    }
}
