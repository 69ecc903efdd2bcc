//! SQLite persistence for categories and expenses.
//!
//! Expenses form an append-only list per user: insertion order is
//! chronological order, and "remove last" deletes the highest rowid.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;

/// Owner sentinel for the shared default category.
pub const DEFAULT_OWNER: i64 = 0;
/// Name of the shared fallback category.
pub const DEFAULT_CATEGORY_NAME: &str = "Общая";
/// Ceiling of the default category, effectively unlimited.
const DEFAULT_CATEGORY_LIMIT: f64 = 100_000_000_000_000.0;
/// Upper bound on waiting for a locked database before a call fails.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A named spending bucket with a ceiling, owned by one user or the
/// shared default owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub limit: f64,
}

/// A single recorded outflow tied to a category.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    pub date: String,
    pub note: String,
    pub category_id: i64,
}

/// SQLite storage gateway.
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let storage = Self::from_conn(Connection::open(path)?)?;
        info!("Opened database at {}", path.display());
        Ok(storage)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::from_conn(Connection::open_in_memory()?)
    }

    fn from_conn(conn: Connection) -> rusqlite::Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                spending_limit REAL NOT NULL,
                UNIQUE (user_id, name)
            );

            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                note TEXT NOT NULL,
                category_id INTEGER NOT NULL REFERENCES categories(id)
            );

            CREATE INDEX IF NOT EXISTS idx_expenses_user ON expenses(user_id);
            CREATE INDEX IF NOT EXISTS idx_expenses_user_category
                ON expenses(user_id, category_id);
        "#,
        )
    }

    /// Seed the shared fallback category. Idempotent, called on every
    /// startup.
    pub fn ensure_default_category(&self) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO categories (user_id, name, spending_limit) VALUES (?1, ?2, ?3)",
            params![DEFAULT_OWNER, DEFAULT_CATEGORY_NAME, DEFAULT_CATEGORY_LIMIT],
        )?;
        Ok(())
    }

    /// The shared fallback category.
    pub fn default_category(&self) -> rusqlite::Result<Option<Category>> {
        self.find_category(DEFAULT_OWNER, DEFAULT_CATEGORY_NAME)
    }

    /// Find a category by name, scoped to the given user.
    pub fn find_category(&self, user_id: i64, name: &str) -> rusqlite::Result<Option<Category>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, user_id, name, spending_limit FROM categories
             WHERE user_id = ?1 AND name = ?2",
            params![user_id, name],
            row_to_category,
        )
        .optional()
    }

    pub fn category_by_id(&self, category_id: i64) -> rusqlite::Result<Option<Category>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, user_id, name, spending_limit FROM categories WHERE id = ?1",
            params![category_id],
            row_to_category,
        )
        .optional()
    }

    pub fn create_category(&self, user_id: i64, name: &str, limit: f64) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO categories (user_id, name, spending_limit) VALUES (?1, ?2, ?3)",
            params![user_id, name, limit],
        )?;
        Ok(())
    }

    pub fn set_category_limit(&self, category_id: i64, limit: f64) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE categories SET spending_limit = ?1 WHERE id = ?2",
            params![limit, category_id],
        )?;
        Ok(())
    }

    /// The user's own categories, excluding the shared default.
    pub fn user_categories(&self, user_id: i64) -> rusqlite::Result<Vec<Category>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, spending_limit FROM categories
             WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_category)?;
        rows.collect()
    }

    /// Append an expense to the user's list.
    pub fn add_expense(
        &self,
        user_id: i64,
        category_id: i64,
        amount: f64,
        date: &str,
        note: &str,
    ) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO expenses (user_id, amount, date, note, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, amount, date, note, category_id],
        )?;
        Ok(())
    }

    /// All of the user's expenses in insertion order.
    pub fn user_expenses(&self, user_id: i64) -> rusqlite::Result<Vec<Expense>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, amount, date, note, category_id FROM expenses
             WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(Expense {
                id: row.get(0)?,
                amount: row.get(1)?,
                date: row.get(2)?,
                note: row.get(3)?,
                category_id: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    /// Remove the most recently appended expense. Returns false when the
    /// user has no expenses.
    pub fn remove_last_expense(&self, user_id: i64) -> rusqlite::Result<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM expenses WHERE id =
                 (SELECT MAX(id) FROM expenses WHERE user_id = ?1)",
            params![user_id],
        )?;
        Ok(removed > 0)
    }

    /// The user's lifetime spend in a category.
    pub fn category_spend(&self, user_id: i64, category_id: i64) -> rusqlite::Result<f64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses
             WHERE user_id = ?1 AND category_id = ?2",
            params![user_id, category_id],
            |row| row.get(0),
        )
    }
}

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        limit: row.get(3)?,
    })
}
