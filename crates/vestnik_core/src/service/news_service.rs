//! News read-side service.
//!
//! # Responsibility
//! - Serve the front-page listing under the configured row limit.
//! - Assemble the detail view of one news item with its comments.
//!
//! # Invariants
//! - Front page is newest first and never exceeds the normalized limit.
//! - Detail comments are oldest first.

use crate::model::comment::Comment;
use crate::model::news::{NewsId, NewsItem};
use crate::repo::comment_repo::CommentRepository;
use crate::repo::news_repo::{normalize_front_page_limit, NewsRepository};
use crate::repo::RepoResult;
use crate::service::{FlowError, FlowResult};

/// Explicit news application settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsConfig {
    /// Rows shown on the front page; normalized before use.
    pub front_page_limit: u32,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            front_page_limit: normalize_front_page_limit(None),
        }
    }
}

/// Detail view of one news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsDetail {
    pub item: NewsItem,
    /// Comments under the item, oldest first.
    pub comments: Vec<Comment>,
}

/// News service facade over repository implementations.
pub struct NewsService<N: NewsRepository, C: CommentRepository> {
    news: N,
    comments: C,
}

impl<N: NewsRepository, C: CommentRepository> NewsService<N, C> {
    /// Creates a service using the provided repository implementations.
    pub fn new(news: N, comments: C) -> Self {
        Self { news, comments }
    }

    /// Lists the newest items first, truncated to the normalized limit.
    pub fn front_page(&self, limit: Option<u32>) -> RepoResult<Vec<NewsItem>> {
        self.news.front_page(normalize_front_page_limit(limit))
    }

    /// Loads one news item together with its ascending comments.
    pub fn detail(&self, id: NewsId) -> FlowResult<NewsDetail> {
        let item = self.news.get(id)?.ok_or(FlowError::NotFound)?;
        let comments = self.comments.list_for_news(item.uuid)?;
        Ok(NewsDetail { item, comments })
    }
}
