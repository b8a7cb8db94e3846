//! SQLite-backed repository via libsql. Implements QuizRepo, SubscriberRepo and ContactRepo.
//!
//! One database file (data/quizhub.db). Question options are stored as a JSON array
//! in a TEXT column; timestamps are unix seconds.

use crate::domain::{
    Category, ContactMessage, Difficulty, DomainError, NewQuestion, Question, Subscriber,
    SubscriptionStatus,
};
use crate::ports::{ContactRepo, QuizRepo, SubscriberRepo};
use chrono::{DateTime, Utc};
use libsql::{Connection, Database, Row, params};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

const CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE
)"#;

const QUESTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS questions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER NOT NULL REFERENCES categories (id),
    prompt TEXT NOT NULL,
    options_json TEXT NOT NULL,
    answer_index INTEGER NOT NULL,
    explanation TEXT,
    difficulty TEXT NOT NULL DEFAULT 'medium'
)"#;
const QUESTIONS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_questions_category ON questions (category_id)";

const SUBSCRIBERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS subscribers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)"#;

const CONTACT_MESSAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contact_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    message TEXT NOT NULL,
    created_at INTEGER NOT NULL
)"#;

const QUESTION_COLUMNS: &str =
    "id, category_id, prompt, options_json, answer_index, explanation, difficulty";

fn repo_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Repo(e.to_string())
}

fn from_unix(secs: i64) -> Result<DateTime<Utc>, DomainError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DomainError::Repo(format!("timestamp out of range: {secs}")))
}

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT_MS: u64 = 5_000;

async fn drain_pragma(conn: &Connection, pragma: &str) -> Result<(), DomainError> {
    // PRAGMA may return a row; execute() fails when rows come back, so drain a query instead.
    let mut rows = conn
        .query(pragma, ())
        .await
        .map_err(|e| DomainError::Repo(format!("{pragma} failed: {e}")))?;
    while rows.next().await.map_err(repo_err)?.is_some() {}
    Ok(())
}

/// SQLite repository. Safe to share via Arc; each call opens its own connection.
///
/// Writes go through `write_lock` so that concurrent requests queue up in
/// process instead of racing for the SQLite write lock.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
    write_lock: Mutex<()>,
}

impl SqliteRepo {
    /// Connect to (or create) the database in `base_dir` and ensure the schema exists.
    ///
    /// Sets WAL mode and synchronous=NORMAL so readers don't block the writer.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(repo_err)?;
        let db_path = base.join("quizhub.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;

        let busy_timeout = format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}");
        for pragma in [
            busy_timeout.as_str(),
            "PRAGMA journal_mode=WAL",
            "PRAGMA synchronous=NORMAL",
        ] {
            drain_pragma(&conn, pragma).await?;
        }

        for ddl in [
            CATEGORIES_TABLE,
            QUESTIONS_TABLE,
            QUESTIONS_INDEX,
            SUBSCRIBERS_TABLE,
            CONTACT_MESSAGES_TABLE,
        ] {
            conn.execute(ddl, ()).await.map_err(repo_err)?;
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self {
            db,
            db_path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// busy_timeout is per connection, so every fresh connection sets it again.
    async fn conn(&self) -> Result<Connection, DomainError> {
        let conn = self.db.connect().map_err(repo_err)?;
        drain_pragma(&conn, &format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}")).await?;
        Ok(conn)
    }

    fn row_to_category(row: &Row) -> Result<Category, DomainError> {
        Ok(Category {
            id: row.get(0).map_err(repo_err)?,
            name: row.get(1).map_err(repo_err)?,
            slug: row.get(2).map_err(repo_err)?,
        })
    }

    fn row_to_question(row: &Row) -> Result<Question, DomainError> {
        let options_json: String = row.get(3).map_err(repo_err)?;
        let options: Vec<String> = serde_json::from_str(&options_json)
            .map_err(|e| DomainError::Repo(format!("corrupt options_json: {e}")))?;
        let answer_index: i64 = row.get(4).map_err(repo_err)?;
        let difficulty: String = row.get(6).map_err(repo_err)?;
        Ok(Question {
            id: row.get(0).map_err(repo_err)?,
            category_id: row.get(1).map_err(repo_err)?,
            prompt: row.get(2).map_err(repo_err)?,
            options,
            answer_index: usize::try_from(answer_index).map_err(repo_err)?,
            explanation: row.get::<Option<String>>(5).map_err(repo_err)?,
            difficulty: difficulty.parse::<Difficulty>()?,
        })
    }

    fn row_to_subscriber(row: &Row) -> Result<Subscriber, DomainError> {
        let status: String = row.get(2).map_err(repo_err)?;
        Ok(Subscriber {
            id: row.get(0).map_err(repo_err)?,
            email: row.get(1).map_err(repo_err)?,
            status: status.parse()?,
            created_at: from_unix(row.get(3).map_err(repo_err)?)?,
            updated_at: from_unix(row.get(4).map_err(repo_err)?)?,
        })
    }

    async fn fetch_question(conn: &Connection, id: i64) -> Result<Option<Question>, DomainError> {
        let mut rows = conn
            .query(
                &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Ok(Some(Self::row_to_question(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl QuizRepo for SqliteRepo {
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query("SELECT id, name, slug FROM categories ORDER BY name", ())
            .await
            .map_err(repo_err)?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            categories.push(Self::row_to_category(&row)?);
        }
        Ok(categories)
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, name, slug FROM categories WHERE slug = ?1",
                params![slug],
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Ok(Some(Self::row_to_category(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert_category(&self, name: &str, slug: &str) -> Result<Category, DomainError> {
        let _guard = self.write_lock.lock().await;
        let conn = self.conn().await?;
        let inserted = conn
            .execute(
                "INSERT INTO categories (name, slug) VALUES (?1, ?2) ON CONFLICT (slug) DO NOTHING",
                params![name, slug],
            )
            .await
            .map_err(repo_err)?;
        if inserted == 0 {
            return Err(DomainError::Validation(format!(
                "category slug already exists: {slug}"
            )));
        }
        let id = conn.last_insert_rowid();
        debug!(id, slug, "inserted category");
        Ok(Category {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        })
    }

    async fn insert_question(
        &self,
        category_id: i64,
        question: &NewQuestion,
    ) -> Result<Question, DomainError> {
        question.validate()?;
        let options_json = serde_json::to_string(&question.options).map_err(repo_err)?;
        let _guard = self.write_lock.lock().await;
        let conn = self.conn().await?;
        conn.execute(
            r#"
            INSERT INTO questions (category_id, prompt, options_json, answer_index, explanation, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                category_id,
                question.prompt.as_str(),
                options_json,
                question.answer_index as i64,
                question.explanation.clone(),
                question.difficulty.as_str()
            ],
        )
        .await
        .map_err(repo_err)?;
        Ok(Question {
            id: conn.last_insert_rowid(),
            category_id,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            answer_index: question.answer_index,
            explanation: question.explanation.clone(),
            difficulty: question.difficulty,
        })
    }

    async fn list_questions(
        &self,
        category_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<Question>, DomainError> {
        let conn = self.conn().await?;
        let mut rows = match category_id {
            Some(category_id) => conn
                .query(
                    &format!(
                        "SELECT {QUESTION_COLUMNS} FROM questions WHERE category_id = ?1 ORDER BY RANDOM() LIMIT ?2"
                    ),
                    params![category_id, limit as i64],
                )
                .await
                .map_err(repo_err)?,
            None => conn
                .query(
                    &format!("SELECT {QUESTION_COLUMNS} FROM questions ORDER BY RANDOM() LIMIT ?1"),
                    params![limit as i64],
                )
                .await
                .map_err(repo_err)?,
        };
        let mut questions = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            questions.push(Self::row_to_question(&row)?);
        }
        Ok(questions)
    }

    async fn question_by_id(&self, id: i64) -> Result<Option<Question>, DomainError> {
        let conn = self.conn().await?;
        Self::fetch_question(&conn, id).await
    }

    async fn questions_by_ids(&self, ids: &[i64]) -> Result<Vec<Question>, DomainError> {
        let conn = self.conn().await?;
        let mut questions = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(q) = Self::fetch_question(&conn, id).await? {
                questions.push(q);
            }
        }
        Ok(questions)
    }

    async fn count_questions(&self) -> Result<u64, DomainError> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query("SELECT COUNT(*) FROM questions", ())
            .await
            .map_err(repo_err)?;
        let count: i64 = match rows.next().await.map_err(repo_err)? {
            Some(row) => row.get(0).map_err(repo_err)?,
            None => 0,
        };
        Ok(count.max(0) as u64)
    }
}

#[async_trait::async_trait]
impl SubscriberRepo for SqliteRepo {
    async fn subscriber_by_email(&self, email: &str) -> Result<Option<Subscriber>, DomainError> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, email, status, created_at, updated_at FROM subscribers WHERE email = ?1",
                params![email],
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Ok(Some(Self::row_to_subscriber(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert_subscriber(&self, email: &str) -> Result<Option<Subscriber>, DomainError> {
        let now = Utc::now();
        let _guard = self.write_lock.lock().await;
        let conn = self.conn().await?;
        let inserted = conn
            .execute(
                r#"
                INSERT INTO subscribers (email, status, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?3)
                ON CONFLICT (email) DO NOTHING
                "#,
                params![email, SubscriptionStatus::Active.as_str(), now.timestamp()],
            )
            .await
            .map_err(repo_err)?;
        if inserted == 0 {
            return Ok(None);
        }
        let id = conn.last_insert_rowid();
        info!(id, "new newsletter subscriber");
        // Stored with second precision; mirror that so callers see what a re-read returns.
        let now = from_unix(now.timestamp())?;
        Ok(Some(Subscriber {
            id,
            email: email.to_string(),
            status: SubscriptionStatus::Active,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn set_subscriber_status(
        &self,
        email: &str,
        status: SubscriptionStatus,
    ) -> Result<bool, DomainError> {
        let _guard = self.write_lock.lock().await;
        let conn = self.conn().await?;
        let changed = conn
            .execute(
                "UPDATE subscribers SET status = ?1, updated_at = ?2 WHERE email = ?3 AND status != ?1",
                params![status.as_str(), Utc::now().timestamp(), email],
            )
            .await
            .map_err(repo_err)?;
        Ok(changed > 0)
    }
}

#[async_trait::async_trait]
impl ContactRepo for SqliteRepo {
    async fn insert_contact_message(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<ContactMessage, DomainError> {
        let created_at = from_unix(Utc::now().timestamp())?;
        let _guard = self.write_lock.lock().await;
        let conn = self.conn().await?;
        conn.execute(
            r#"
            INSERT INTO contact_messages (name, email, message, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![name, email, message, created_at.timestamp()],
        )
        .await
        .map_err(repo_err)?;
        Ok(ContactMessage {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_question(prompt: &str, answer_index: usize) -> NewQuestion {
        NewQuestion {
            prompt: prompt.to_string(),
            options: vec!["a".into(), "b".into(), "c".into()],
            answer_index,
            explanation: Some("see docs".into()),
            difficulty: Difficulty::Hard,
        }
    }

    #[tokio::test]
    async fn test_categories_and_questions_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();

        let rust = repo.insert_category("Rust", "rust").await.unwrap();
        let net = repo.insert_category("Networking", "net").await.unwrap();
        assert!(repo.insert_category("Rust again", "rust").await.is_err());

        let q = repo.insert_question(rust.id, &new_question("q1", 2)).await.unwrap();
        repo.insert_question(rust.id, &new_question("q2", 0)).await.unwrap();
        repo.insert_question(net.id, &new_question("q3", 1)).await.unwrap();

        let names: Vec<_> = repo
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Networking", "Rust"]);

        let stored = repo.question_by_id(q.id).await.unwrap().unwrap();
        assert_eq!(stored, q);
        assert_eq!(stored.explanation.as_deref(), Some("see docs"));

        let rust_only = repo.list_questions(Some(rust.id), 10).await.unwrap();
        assert_eq!(rust_only.len(), 2);
        assert!(rust_only.iter().all(|q| q.category_id == rust.id));
        assert_eq!(repo.list_questions(None, 2).await.unwrap().len(), 2);
        assert_eq!(repo.count_questions().await.unwrap(), 3);

        let found = repo.questions_by_ids(&[q.id, 9999]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(repo.question_by_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_question_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        let cat = repo.insert_category("Rust", "rust").await.unwrap();
        let err = repo
            .insert_question(cat.id, &new_question("bad", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(repo.count_questions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_subscriber_status_updates() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();

        let s = repo.insert_subscriber("ada@example.com").await.unwrap().unwrap();
        assert_eq!(repo.insert_subscriber("ada@example.com").await.unwrap(), None);
        assert_eq!(
            repo.subscriber_by_email("ada@example.com").await.unwrap(),
            Some(s)
        );

        assert!(
            repo.set_subscriber_status("ada@example.com", SubscriptionStatus::Unsubscribed)
                .await
                .unwrap()
        );
        assert!(
            !repo
                .set_subscriber_status("ada@example.com", SubscriptionStatus::Unsubscribed)
                .await
                .unwrap()
        );
        assert!(
            !repo
                .set_subscriber_status("nobody@example.com", SubscriptionStatus::Active)
                .await
                .unwrap()
        );
        let s = repo.subscriber_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(s.status, SubscriptionStatus::Unsubscribed);
    }

    #[tokio::test]
    async fn test_schema_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        {
            let repo = SqliteRepo::connect(dir.path()).await.unwrap();
            repo.insert_contact_message("Ada", "ada@example.com", "hi")
                .await
                .unwrap();
            repo.insert_category("Rust", "rust").await.unwrap();
        }
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        assert!(repo.db_path().ends_with("quizhub.db"));
        assert!(repo.category_by_slug("rust").await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_category_inserts_keep_slug_unique() {
        let dir = tempfile::tempdir().unwrap();
        let repo = std::sync::Arc::new(SqliteRepo::connect(dir.path()).await.unwrap());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = std::sync::Arc::clone(&repo);
                tokio::spawn(async move { repo.insert_category("Rust", "rust").await })
            })
            .collect();
        let mut inserted = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => inserted += 1,
                Err(e) => assert!(matches!(e, DomainError::Validation(_)), "{e}"),
            }
        }
        assert_eq!(inserted, 1);
        assert_eq!(repo.list_categories().await.unwrap().len(), 1);
    }
}
