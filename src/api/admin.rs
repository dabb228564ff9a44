use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::Query;
use serde::Deserialize;
use tracing::instrument;

use super::{PostStore, Result};

use crate::{
    config::ReaderMode,
    content::{Editor, PostForm, Submission},
    state::AppState,
    storage::StoreError,
    view::{self, AdminPage, ConfirmDeletePage, MessagePage, PageMeta},
};

/// 配置管理页面路由。
///
/// - `GET /`：文章列表与表单，`?edit={slug}` 进入编辑状态
/// - `POST /admin/posts`：新建文章
/// - `POST /admin/posts/{slug}`：更新文章
/// - `GET /admin/posts/{slug}/delete`：删除确认
/// - `POST /admin/posts/{slug}/delete`：确认后删除
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/admin/posts", post(create_post))
        .route("/admin/posts/{slug}", post(update_post))
        .route(
            "/admin/posts/{slug}/delete",
            get(confirm_delete).post(delete_post),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DashboardParams {
    edit: Option<String>,
}

fn store_alert(err: &StoreError) -> String {
    format!("{}{err}", view::STORE_ERROR_PREFIX)
}

/// 渲染管理页面
///
/// 每次渲染都重新获取文章列表；获取失败时以空列表展示并提示错误。
async fn admin_page(
    app: &AppState,
    editor: &Editor,
    alert: Option<String>,
    status: StatusCode,
) -> Result<Response> {
    let (posts, list_alert) = match app.store().list().await {
        Ok(posts) => (posts, None),
        Err(e) => {
            tracing::error!(%e, "failed to list posts");
            (Vec::new(), Some(store_alert(&e)))
        }
    };

    let mut page = AdminPage::new(
        PageMeta::site(app.site()),
        posts,
        editor,
        app.reader() == ReaderMode::Redirect,
    );
    if let Some(alert) = alert.or(list_alert) {
        page = page.with_alert(alert);
    }

    Ok((status, view::render(&page)?).into_response())
}

/// 管理页面
async fn dashboard(
    State(app): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Response> {
    let Some(slug) = params.edit else {
        return admin_page(&app, &Editor::blank(), None, StatusCode::OK).await;
    };

    match app.store().get(&slug).await {
        Ok(Some(post)) => admin_page(&app, &Editor::editing(&post), None, StatusCode::OK).await,
        Ok(None) => {
            tracing::warn!(%slug, "edit target not found");
            admin_page(&app, &Editor::blank(), None, StatusCode::OK).await
        }
        Err(e) => {
            tracing::error!(%e, %slug, "failed to fetch edit target");
            admin_page(
                &app,
                &Editor::blank(),
                Some(store_alert(&e)),
                StatusCode::BAD_GATEWAY,
            )
            .await
        }
    }
}

async fn create_post(State(app): State<AppState>, Form(form): Form<PostForm>) -> Result<Response> {
    submit(&app, Editor::creating(form)).await
}

async fn update_post(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Form(form): Form<PostForm>,
) -> Result<Response> {
    submit(&app, Editor::editing_with(slug, form)).await
}

/// 提交表单
///
/// 成功后回到空白的新建表单；失败时保留表单内容与编辑状态并提示错误。
#[instrument(skip_all, fields(slug = %editor.slug()))]
async fn submit(app: &AppState, editor: Editor) -> Result<Response> {
    if let Err(e) = editor.validate(app.reader() == ReaderMode::Redirect) {
        tracing::warn!(%e, "invalid post form");
        return admin_page(
            app,
            &editor,
            Some(e.to_string()),
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .await;
    }

    let result = match editor.submission() {
        Submission::Insert(post) => app.store().insert(post).await.map(|created| {
            tracing::info!(id = created.id, "post created");
        }),
        Submission::Update { slug, changes } => {
            app.store().update(&slug, changes).await.map(|updated| {
                if updated.is_none() {
                    tracing::warn!("no post matched the update");
                } else {
                    tracing::info!("post updated");
                }
            })
        }
    };

    match result {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(e) => {
            tracing::error!(%e, "store rejected post");
            admin_page(app, &editor, Some(store_alert(&e)), StatusCode::BAD_GATEWAY).await
        }
    }
}

/// 删除确认页面，本身不产生任何修改
async fn confirm_delete(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response> {
    match app.store().get(&slug).await {
        Ok(Some(post)) => {
            let page = ConfirmDeletePage::new(
                PageMeta::titled(app.site(), view::CONFIRM_DELETE),
                post,
            );
            Ok(view::render(&page)?.into_response())
        }
        Ok(None) => {
            let page = MessagePage {
                meta: PageMeta::not_found(app.site()),
                message: view::ARTICLE_NOT_FOUND.to_string(),
            };
            Ok((StatusCode::NOT_FOUND, view::render(&page)?).into_response())
        }
        Err(e) => {
            tracing::error!(%e, %slug, "failed to fetch post for deletion");
            admin_page(
                &app,
                &Editor::blank(),
                Some(store_alert(&e)),
                StatusCode::BAD_GATEWAY,
            )
            .await
        }
    }
}

/// 确认后按 slug 删除文章
async fn delete_post(State(app): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    match app.store().delete(&slug).await {
        Ok(deleted) => {
            tracing::info!(%slug, deleted, "post deleted");
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::error!(%e, %slug, "failed to delete post");
            admin_page(
                &app,
                &Editor::blank(),
                Some(store_alert(&e)),
                StatusCode::BAD_GATEWAY,
            )
            .await
        }
    }
}
