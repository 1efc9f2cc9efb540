//! Metadata store trait and SQLite implementation.

use crate::error::MetadataResult;
use crate::models::{BookRow, NewBook};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Book metadata index.
///
/// All operations are single-record reads/writes; listing order is
/// `uploaded_at` descending with ties broken by `id` descending.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity.
    async fn health_check(&self) -> MetadataResult<()>;

    /// Insert a book record, returning it with its assigned id.
    async fn insert_book(&self, book: &NewBook) -> MetadataResult<BookRow>;

    /// Look up a book by id.
    async fn get_book(&self, id: i64) -> MetadataResult<Option<BookRow>>;

    /// All books, most recently uploaded first.
    async fn list_books(&self) -> MetadataResult<Vec<BookRow>>;

    /// Books in a category, most recently uploaded first.
    async fn list_books_by_category(&self, category: &str) -> MetadataResult<Vec<BookRow>>;

    /// Delete a book record. Returns false if the id was absent.
    async fn delete_book(&self, id: i64) -> MetadataResult<bool>;
}

/// Schema for the book index.
///
/// AUTOINCREMENT keeps deleted ids from being reused.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    category TEXT NOT NULL,
    storage_key TEXT NOT NULL,
    access_url TEXT,
    uploaded_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_books_uploaded_at ON books(uploaded_at DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_books_category ON books(category, uploaded_at DESC);
"#;

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store, running migrations.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // "database is locked" failures under concurrent requests.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_book(&self, book: &NewBook) -> MetadataResult<BookRow> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (title, category, storage_key, access_url, uploaded_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, title, category, storage_key, access_url, uploaded_at
            "#,
        )
        .bind(&book.title)
        .bind(&book.category)
        .bind(&book.storage_key)
        .bind(&book.access_url)
        .bind(book.uploaded_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_book(&self, id: i64) -> MetadataResult<Option<BookRow>> {
        let row = sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_books(&self) -> MetadataResult<Vec<BookRow>> {
        let rows = sqlx::query_as::<_, BookRow>(
            "SELECT * FROM books ORDER BY uploaded_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_books_by_category(&self, category: &str) -> MetadataResult<Vec<BookRow>> {
        let rows = sqlx::query_as::<_, BookRow>(
            "SELECT * FROM books WHERE category = ? ORDER BY uploaded_at DESC, id DESC",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_book(&self, id: i64) -> MetadataResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    async fn store() -> (tempfile::TempDir, SqliteStore) {
        let temp = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(temp.path().join("metadata.db"))
            .await
            .unwrap();
        (temp, store)
    }

    fn book(title: &str, category: &str, uploaded_at: OffsetDateTime) -> NewBook {
        NewBook {
            title: title.to_string(),
            category: category.to_string(),
            storage_key: format!("{title}.pdf"),
            access_url: None,
            uploaded_at,
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let (_temp, store) = store().await;
        let now = OffsetDateTime::now_utc();

        let a = store.insert_book(&book("a", "Fiction", now)).await.unwrap();
        let b = store.insert_book(&book("b", "Fiction", now)).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(a.title, "a");
    }

    #[tokio::test]
    async fn list_orders_by_upload_time_desc() {
        let (_temp, store) = store().await;
        let now = OffsetDateTime::now_utc();

        store
            .insert_book(&book("older", "Fiction", now - time::Duration::minutes(5)))
            .await
            .unwrap();
        store.insert_book(&book("newer", "Fiction", now)).await.unwrap();

        let titles: Vec<String> = store
            .list_books()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn list_breaks_timestamp_ties_by_id() {
        let (_temp, store) = store().await;
        let now = OffsetDateTime::now_utc();

        let first = store.insert_book(&book("first", "Fiction", now)).await.unwrap();
        let second = store.insert_book(&book("second", "Fiction", now)).await.unwrap();

        let ids: Vec<i64> = store
            .list_books()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn category_listing_is_ordered_subset() {
        let (_temp, store) = store().await;
        let now = OffsetDateTime::now_utc();

        store
            .insert_book(&book("f1", "Fiction", now - time::Duration::minutes(2)))
            .await
            .unwrap();
        store
            .insert_book(&book("h1", "History", now - time::Duration::minutes(1)))
            .await
            .unwrap();
        store.insert_book(&book("f2", "Fiction", now)).await.unwrap();

        let fiction: Vec<String> = store
            .list_books_by_category("Fiction")
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(fiction, vec!["f2", "f1"]);

        assert!(store
            .list_books_by_category("Poetry")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_temp, store) = store().await;
        let row = store
            .insert_book(&book("x", "Fiction", OffsetDateTime::now_utc()))
            .await
            .unwrap();

        assert!(store.delete_book(row.id).await.unwrap());
        assert!(!store.delete_book(row.id).await.unwrap());
        assert!(store.get_book(row.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let (_temp, store) = store().await;
        let now = OffsetDateTime::now_utc();

        let a = store.insert_book(&book("a", "Fiction", now)).await.unwrap();
        store.delete_book(a.id).await.unwrap();
        let b = store.insert_book(&book("b", "Fiction", now)).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn access_url_roundtrips() {
        let (_temp, store) = store().await;
        let mut new = book("remote", "Fiction", OffsetDateTime::now_utc());
        new.access_url = Some("https://cdn.example.com/books/remote.pdf".to_string());

        let row = store.insert_book(&new).await.unwrap();
        let fetched = store.get_book(row.id).await.unwrap().unwrap();
        assert_eq!(fetched.access_url.as_deref(), Some("https://cdn.example.com/books/remote.pdf"));
    }
}
