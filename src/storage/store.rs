use crate::{
    config::StoreConfig,
    content::{NewPost, Post, PostChanges},
};

use super::{MemoryStore, PgStore, RestStore};

/// 存储端返回的错误
///
/// 瞬时错误与永久错误不作区分，均原样展示给用户。
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 存储端拒绝了请求，携带其返回的消息
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// 违反唯一约束
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("unsupported store url: {0}")]
    UnsupportedUrl(String),
}

/// 文章的增删改查接口
///
/// 所有对外操作都以 `slug` 为键，而不是 `id`。
pub trait PostStore: Send + Sync {
    /// 按创建时间倒序返回全部文章
    fn list(&self) -> impl Future<Output = Result<Vec<Post>, StoreError>> + Send;

    /// 按 slug 查询单篇文章，不存在时返回 `None`
    fn get(&self, slug: &str) -> impl Future<Output = Result<Option<Post>, StoreError>> + Send;

    /// 插入一篇文章，返回存储端分配了 `id` 与 `created_at` 的记录
    fn insert(&self, post: NewPost) -> impl Future<Output = Result<Post, StoreError>> + Send;

    /// 更新 slug 对应的文章，未匹配到时返回 `None`
    fn update(
        &self,
        slug: &str,
        changes: PostChanges,
    ) -> impl Future<Output = Result<Option<Post>, StoreError>> + Send;

    /// 删除 slug 对应的文章，返回是否有记录被删除
    fn delete(&self, slug: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

/// 运行时选定的存储后端
#[derive(Clone)]
pub enum Store {
    Rest(RestStore),
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl Store {
    /// 根据存储地址的 scheme 选择后端
    ///
    /// - `http://`、`https://`：REST 接口
    /// - `postgres://`、`postgresql://`：直连数据库，访问密钥作为连接密码
    /// - `memory:`：进程内存储
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config.url.as_str();

        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(Self::Rest(RestStore::new(url, &config.key)?))
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres(PgStore::connect(url, &config.key).await?))
        } else if url.starts_with("memory:") {
            Ok(Self::Memory(MemoryStore::default()))
        } else {
            Err(StoreError::UnsupportedUrl(url.to_string()))
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::Rest(_) => "rest",
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

impl From<MemoryStore> for Store {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

impl PostStore for Store {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        match self {
            Self::Rest(s) => s.list().await,
            Self::Postgres(s) => s.list().await,
            Self::Memory(s) => s.list().await,
        }
    }

    async fn get(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        match self {
            Self::Rest(s) => s.get(slug).await,
            Self::Postgres(s) => s.get(slug).await,
            Self::Memory(s) => s.get(slug).await,
        }
    }

    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        match self {
            Self::Rest(s) => s.insert(post).await,
            Self::Postgres(s) => s.insert(post).await,
            Self::Memory(s) => s.insert(post).await,
        }
    }

    async fn update(&self, slug: &str, changes: PostChanges) -> Result<Option<Post>, StoreError> {
        match self {
            Self::Rest(s) => s.update(slug, changes).await,
            Self::Postgres(s) => s.update(slug, changes).await,
            Self::Memory(s) => s.update(slug, changes).await,
        }
    }

    async fn delete(&self, slug: &str) -> Result<bool, StoreError> {
        match self {
            Self::Rest(s) => s.delete(slug).await,
            Self::Postgres(s) => s.delete(slug).await,
            Self::Memory(s) => s.delete(slug).await,
        }
    }
}
