//! Key/value state operations.

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Database, DbResult};

const UPSERT_STATE: &str = r#"
    INSERT INTO app_state (key, value, updated_at)
    VALUES (?1, ?2, datetime('now'))
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

impl Database {
    /// Read a raw state value.
    pub fn get_state(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Write a raw state value, replacing any previous one.
    pub fn put_state(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(UPSERT_STATE, params![key, value])?;
        Ok(())
    }

    /// Write several values in one transaction. Either all land or none do.
    pub fn put_states(&mut self, entries: &[(&str, &str)]) -> DbResult<()> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(UPSERT_STATE, params![key, value])?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Remove a state value.
    pub fn delete_state(&self, key: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM app_state WHERE key = ?", [key])?;
        Ok(rows_affected > 0)
    }

    /// Serialize and store a whole document under `key`.
    pub fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> DbResult<()> {
        let json = serde_json::to_string(value)?;
        self.put_state(key, &json)
    }

    /// Load and deserialize the document under `key`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        match self.get_state(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DbError, ACTIVE_DOG_KEY, DOGS_KEY, PROXY_URL_KEY};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        assert_eq!(db.get_state(ACTIVE_DOG_KEY).unwrap(), None);
    }

    #[test]
    fn test_put_overwrites() {
        let db = setup_db();
        db.put_state(ACTIVE_DOG_KEY, "dog-a").unwrap();
        db.put_state(ACTIVE_DOG_KEY, "dog-b").unwrap();
        assert_eq!(db.get_state(ACTIVE_DOG_KEY).unwrap(), Some("dog-b".into()));
    }

    #[test]
    fn test_delete_state() {
        let db = setup_db();
        db.put_state(PROXY_URL_KEY, "https://relay.local").unwrap();
        assert!(db.delete_state(PROXY_URL_KEY).unwrap());
        assert!(!db.delete_state(PROXY_URL_KEY).unwrap());
        assert_eq!(db.get_state(PROXY_URL_KEY).unwrap(), None);
    }

    #[test]
    fn test_put_states_writes_all() {
        let mut db = setup_db();
        db.put_states(&[(DOGS_KEY, "[]"), (ACTIVE_DOG_KEY, "dog-a")])
            .unwrap();
        assert_eq!(db.get_state(DOGS_KEY).unwrap(), Some("[]".into()));
        assert_eq!(db.get_state(ACTIVE_DOG_KEY).unwrap(), Some("dog-a".into()));
    }

    #[test]
    fn test_put_states_rolls_back_on_failure() {
        let mut db = setup_db();
        db.put_state(ACTIVE_DOG_KEY, "dog-a").unwrap();
        db.conn()
            .execute_batch(
                "CREATE TRIGGER reject_dogs BEFORE INSERT ON app_state
                 WHEN NEW.key = 'pooch_dogs_v2'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = db.put_states(&[(ACTIVE_DOG_KEY, "dog-b"), (DOGS_KEY, "[]")]);
        assert!(matches!(result, Err(DbError::Sqlite(_))));
        assert_eq!(db.get_state(ACTIVE_DOG_KEY).unwrap(), Some("dog-a".into()));
        assert_eq!(db.get_state(DOGS_KEY).unwrap(), None);
    }

    #[test]
    fn test_json_documents() {
        let db = setup_db();
        db.put_json(DOGS_KEY, &vec!["a", "b"]).unwrap();
        let loaded: Option<Vec<String>> = db.get_json(DOGS_KEY).unwrap();
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        let db = setup_db();
        db.put_state(DOGS_KEY, "{not json").unwrap();
        let loaded: DbResult<Option<Vec<String>>> = db.get_json(DOGS_KEY);
        assert!(matches!(loaded, Err(DbError::Json(_))));
    }
}
