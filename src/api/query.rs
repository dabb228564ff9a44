use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};

use super::{Error, PostStore, Result};

use crate::{
    content::{Post, slugify},
    state::AppState,
    storage::Store,
};

/// 配置只读 JSON 接口。
///
/// - `GET /posts`：按创建时间倒序的文章列表
/// - `GET /posts/{slug}`：获取单篇文章
/// - `GET /slug?title=...`：预览标题生成的 slug
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/posts", get(post_list))
        .route("/posts/{slug}", get(post_detail))
        .route("/slug", get(slug_preview))
}

/// 获取全部文章
async fn post_list(State(store): State<Store>) -> Result<Json<Vec<Post>>> {
    Ok(Json(store.list().await?))
}

/// 根据 slug 获取单篇文章。
///
/// 文章不存在时返回 [`Error::NotFound`]。
async fn post_detail(Path(slug): Path<String>, State(store): State<Store>) -> Result<Json<Post>> {
    let post = store.get(&slug).await?.ok_or(Error::NotFound)?;
    Ok(Json(post))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SlugParams {
    title: String,
}

#[derive(Debug, Serialize)]
pub struct SlugPreview {
    slug: String,
}

/// 新建文章时的 slug 预览
async fn slug_preview(Query(params): Query<SlugParams>) -> Json<SlugPreview> {
    Json(SlugPreview {
        slug: slugify(&params.title),
    })
}
