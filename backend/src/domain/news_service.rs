use std::sync::Arc;

use shared::{CreateNewsRequest, NewsPost};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::clock::{format_timestamp, Clock};
use crate::domain::errors::{PortalError, PortalResult};
use crate::storage::NewsRepository;

/// Number of posts shown to signed-in members on the home page
pub const HOME_NEWS_LIMIT: u32 = 10;

#[derive(Clone)]
pub struct NewsService {
    news: NewsRepository,
    clock: Arc<dyn Clock>,
}

impl NewsService {
    pub fn new(news: NewsRepository, clock: Arc<dyn Clock>) -> Self {
        Self { news, clock }
    }

    /// The newest `limit` posts
    pub async fn latest(&self, limit: u32) -> PortalResult<Vec<NewsPost>> {
        Ok(self.news.list_posts(Some(limit)).await?)
    }

    /// Every post, newest first
    pub async fn list_all(&self) -> PortalResult<Vec<NewsPost>> {
        Ok(self.news.list_posts(None).await?)
    }

    pub async fn create_post(&self, request: CreateNewsRequest) -> PortalResult<NewsPost> {
        let title = request.title.trim();
        let content = request.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(PortalError::validation("Title and content are required"));
        }

        let post = NewsPost {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: format_timestamp(self.clock.now()),
        };
        self.news.store_post(&post).await?;

        info!("Published news post {}: {}", post.id, post.title);
        Ok(post)
    }

    pub async fn delete_post(&self, post_id: &str) -> PortalResult<()> {
        if !self.news.delete_post(post_id).await? {
            warn!("News post not found: {}", post_id);
            return Err(PortalError::not_found(format!("News post {}", post_id)));
        }
        info!("Deleted news post {}", post_id);
        Ok(())
    }
}
