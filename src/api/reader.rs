use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};

use super::{PostStore, Result};

use crate::{
    config::ReaderMode,
    state::AppState,
    view::{self, MessagePage, PageMeta, PostPage},
};

/// 配置文章页路由。
///
/// `/posts/{slug}` 在启动时根据 [`ReaderMode`] 绑定到文章渲染或外部跳转，二者互斥。
pub fn setup_route(mode: ReaderMode) -> Router<AppState> {
    let handler: MethodRouter<AppState> = match mode {
        ReaderMode::Article => get(article),
        ReaderMode::Redirect => get(redirect),
    };
    Router::new().route("/posts/{slug}", handler)
}

/// 渲染单篇文章，并设置分享用的 meta 标签
///
/// 文章不存在或查询失败时返回 404 页面。
async fn article(Path(slug): Path<String>, State(app): State<AppState>) -> Result<Response> {
    match app.store().get(&slug).await {
        Ok(Some(post)) => {
            let page = PostPage {
                meta: PageMeta::article(app.site(), &post),
                post,
            };
            Ok(view::render(&page)?.into_response())
        }
        Ok(None) => not_found(PageMeta::not_found(app.site()), view::ARTICLE_NOT_FOUND),
        Err(e) => {
            tracing::error!(%e, %slug, "failed to fetch post");
            not_found(PageMeta::not_found(app.site()), view::ARTICLE_NOT_FOUND)
        }
    }
}

/// 跳转到文章的外部链接
///
/// 只查询一次；文章不存在、链接为空或查询失败时返回 404 页面，不产生跳转。
async fn redirect(Path(slug): Path<String>, State(app): State<AppState>) -> Result<Response> {
    match app.store().get(&slug).await {
        Ok(Some(post)) => {
            if let Some(location) = post
                .redirect_target()
                .and_then(|url| HeaderValue::from_str(url).ok())
            {
                let headers = [(header::LOCATION, location)];
                return Ok((StatusCode::TEMPORARY_REDIRECT, headers).into_response());
            }
            tracing::debug!(%slug, "post has no redirect target");
        }
        Ok(None) => {}
        Err(e) => tracing::error!(%e, %slug, "failed to fetch post"),
    }

    not_found(PageMeta::site(app.site()), view::REDIRECT_NOT_FOUND)
}

fn not_found(meta: PageMeta, message: &str) -> Result<Response> {
    let page = MessagePage {
        meta,
        message: message.to_string(),
    };
    Ok((StatusCode::NOT_FOUND, view::render(&page)?).into_response())
}
