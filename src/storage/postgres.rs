use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::content::{NewPost, Post, PostChanges};

use super::{PostStore, StoreError};

/// 数据库连接池类型
pub type DBPool = sqlx::PgPool;

const COLUMNS: &str = r#"id, created_at, title, description, image, slug, "externalUrl""#;

/// 直连 Postgres 的文章存储
#[derive(Clone)]
pub struct PgStore {
    pool: DBPool,
}

impl PgStore {
    /// 连接数据库，访问密钥作为连接密码
    pub async fn connect(url: &str, key: &str) -> Result<Self, StoreError> {
        let options = url.parse::<PgConnectOptions>()?.password(key);
        Ok(Self {
            pool: new_db_pool(options).await?,
        })
    }

    pub fn from_pool(pool: DBPool) -> Self {
        Self { pool }
    }
}

/// 根据连接参数创建新的数据库连接池
///
/// 连接池配置：
///
/// - 最大空闲时间 60 秒
/// - 最大生存时间 1500 秒（约 25 分钟）
/// - 最大连接数 10
/// - 获取连接超时 2 秒
/// - 获取前测试连接
/// - 最小连接数 2
pub async fn new_db_pool(options: PgConnectOptions) -> Result<DBPool, sqlx::Error> {
    PgPoolOptions::new()
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(1500))
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(2))
        .test_before_acquire(true)
        .min_connections(2)
        .connect_with(options)
        .await
}

/// 执行 SQL 文件中的迁移语句
///
/// 将文件内容按 `;` 分割，每条 SQL 单独执行
pub async fn migrate(db: &DBPool, file: &str) -> Result<(), sqlx::Error> {
    let content = tokio::fs::read_to_string(file).await?;

    for sql in content.split(';') {
        if sql.trim().is_empty() {
            continue;
        }
        sqlx::query(sql).execute(db).await?;
    }
    Ok(())
}

impl PostStore for PgStore {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query_as::<_, Post>(&format!(
            "SELECT {COLUMNS} FROM posts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, Post>(&format!(
            "SELECT {COLUMNS} FROM posts WHERE slug = $1 LIMIT 1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        let row = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (title, description, image, slug, "externalUrl")
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(post.title)
        .bind(post.description)
        .bind(post.image)
        .bind(post.slug)
        .bind(post.external_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, slug: &str, changes: PostChanges) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET
                title = $1,
                description = $2,
                image = $3,
                "externalUrl" = $4
            WHERE slug = $5
            RETURNING {COLUMNS}
            "#
        ))
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.image)
        .bind(changes.external_url)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, slug: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
