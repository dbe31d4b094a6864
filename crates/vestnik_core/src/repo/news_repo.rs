//! News repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist news items and serve the front-page projection.
//!
//! # Invariants
//! - Front page ordering is deterministic: `published_at DESC, uuid ASC`.
//! - Write paths call `NewsItem::validate()` before SQL mutations.

use crate::model::news::{NewsId, NewsItem};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoResult};
use rusqlite::{params, Connection, Row};

const NEWS_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    body,
    published_at,
    created_at
FROM news";

const FRONT_PAGE_DEFAULT_LIMIT: u32 = 10;
const FRONT_PAGE_LIMIT_MAX: u32 = 50;

/// Normalizes the front-page row limit according to the news contract.
pub fn normalize_front_page_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => FRONT_PAGE_DEFAULT_LIMIT,
        Some(value) if value > FRONT_PAGE_LIMIT_MAX => FRONT_PAGE_LIMIT_MAX,
        Some(value) => value,
        None => FRONT_PAGE_DEFAULT_LIMIT,
    }
}

/// Repository interface for news records.
pub trait NewsRepository {
    /// Creates one news item and returns its stable id.
    fn insert(&self, item: &NewsItem) -> RepoResult<NewsId>;
    /// Gets one news item by id.
    fn get(&self, id: NewsId) -> RepoResult<Option<NewsItem>>;
    /// Lists the newest items first, truncated to `limit` rows.
    fn front_page(&self, limit: u32) -> RepoResult<Vec<NewsItem>>;
    /// Counts all stored news items.
    fn count(&self) -> RepoResult<i64>;
}

/// SQLite-backed news repository.
pub struct SqliteNewsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNewsRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "news",
            &["uuid", "title", "body", "published_at", "created_at"],
        )?;
        Ok(Self { conn })
    }
}

impl NewsRepository for SqliteNewsRepository<'_> {
    fn insert(&self, item: &NewsItem) -> RepoResult<NewsId> {
        item.validate()?;

        self.conn.execute(
            "INSERT INTO news (uuid, title, body, published_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                item.uuid.to_string(),
                item.title.as_str(),
                item.body.as_str(),
                item.published_at,
            ],
        )?;

        Ok(item.uuid)
    }

    fn get(&self, id: NewsId) -> RepoResult<Option<NewsItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NEWS_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_news_row(row)?));
        }
        Ok(None)
    }

    fn front_page(&self, limit: u32) -> RepoResult<Vec<NewsItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NEWS_SELECT_SQL}
             ORDER BY published_at DESC, uuid ASC
             LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_news_row(row)?);
        }
        Ok(items)
    }

    fn count(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM news;", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn parse_news_row(row: &Row<'_>) -> RepoResult<NewsItem> {
    let uuid_text: String = row.get("uuid")?;
    let item = NewsItem {
        uuid: parse_uuid(&uuid_text, "news.uuid")?,
        title: row.get("title")?,
        body: row.get("body")?,
        published_at: row.get("published_at")?,
        created_at: row.get("created_at")?,
    };
    item.validate()?;
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::normalize_front_page_limit;

    #[test]
    fn front_page_limit_defaults_and_caps() {
        assert_eq!(normalize_front_page_limit(None), 10);
        assert_eq!(normalize_front_page_limit(Some(0)), 10);
        assert_eq!(normalize_front_page_limit(Some(3)), 3);
        assert_eq!(normalize_front_page_limit(Some(50)), 50);
        assert_eq!(normalize_front_page_limit(Some(500)), 50);
    }
}
