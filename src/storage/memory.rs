use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::content::{NewPost, Post, PostChanges};

use super::{PostStore, StoreError};

/// 进程内的文章存储
///
/// 行为与数据库表一致：`id` 自增、`created_at` 插入时生成、`slug` 唯一。
/// 克隆后共享同一份数据。
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Table>>,
}

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: Vec<Post>,
    fail_next: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置若干记录，保留其 `id` 与 `created_at`
    pub async fn seed(&self, posts: impl IntoIterator<Item = Post>) {
        let mut table = self.inner.write().await;
        for post in posts {
            table.last_id = table.last_id.max(post.id);
            table.rows.push(post);
        }
    }

    /// 让下一次操作以 [`StoreError::Rejected`] 失败，用于模拟存储端错误
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.inner.write().await.fail_next = Some(message.into());
    }

    async fn check_failure(&self) -> Result<(), StoreError> {
        match self.inner.write().await.fail_next.take() {
            Some(message) => Err(StoreError::Rejected {
                status: 503,
                message,
            }),
            None => Ok(()),
        }
    }
}

impl PostStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        self.check_failure().await?;
        let table = self.inner.read().await;
        let mut rows = table.rows.clone();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(rows)
    }

    async fn get(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        self.check_failure().await?;
        let table = self.inner.read().await;
        Ok(table.rows.iter().find(|p| p.slug == slug).cloned())
    }

    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        self.check_failure().await?;
        let mut table = self.inner.write().await;

        if table.rows.iter().any(|p| p.slug == post.slug) {
            return Err(StoreError::Conflict(
                r#"duplicate key value violates unique constraint "posts_slug_key""#.to_string(),
            ));
        }

        table.last_id += 1;
        let row = Post {
            id: table.last_id,
            created_at: Utc::now(),
            title: post.title,
            description: post.description,
            image: post.image,
            slug: post.slug,
            external_url: post.external_url,
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, slug: &str, changes: PostChanges) -> Result<Option<Post>, StoreError> {
        self.check_failure().await?;
        let mut table = self.inner.write().await;

        Ok(table.rows.iter_mut().find(|p| p.slug == slug).map(|row| {
            row.title = changes.title;
            row.description = changes.description;
            row.image = changes.image;
            row.external_url = changes.external_url;
            row.clone()
        }))
    }

    async fn delete(&self, slug: &str) -> Result<bool, StoreError> {
        self.check_failure().await?;
        let mut table = self.inner.write().await;
        let before = table.rows.len();
        table.rows.retain(|p| p.slug != slug);
        Ok(table.rows.len() != before)
    }
}
