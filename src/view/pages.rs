use askama::Template;

use crate::content::{Editor, Post, PostForm};

use super::{CONFIRM_DELETE, PageMeta};

/// 管理页面：文章表单与文章列表
#[derive(Debug, Template)]
#[template(path = "admin.html")]
pub struct AdminPage {
    pub meta: PageMeta,
    pub posts: Vec<Post>,
    pub form: PostForm,
    pub slug: String,
    pub editing: Option<String>,
    pub require_external_url: bool,
    pub alert: Option<String>,
}

impl AdminPage {
    pub fn new(
        meta: PageMeta,
        posts: Vec<Post>,
        editor: &Editor,
        require_external_url: bool,
    ) -> Self {
        Self {
            meta,
            posts,
            form: editor.form().clone(),
            slug: editor.slug().to_string(),
            editing: editor.editing_slug().map(str::to_string),
            require_external_url,
            alert: None,
        }
    }

    pub fn with_alert(mut self, alert: impl Into<String>) -> Self {
        self.alert = Some(alert.into());
        self
    }
}

/// 删除确认页面
#[derive(Debug, Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeletePage {
    pub meta: PageMeta,
    pub post: Post,
    pub question: &'static str,
}

impl ConfirmDeletePage {
    pub fn new(meta: PageMeta, post: Post) -> Self {
        Self {
            meta,
            post,
            question: CONFIRM_DELETE,
        }
    }
}

/// 文章页
#[derive(Debug, Template)]
#[template(path = "post.html")]
pub struct PostPage {
    pub meta: PageMeta,
    pub post: Post,
}

/// 只包含一行提示的页面
#[derive(Debug, Template)]
#[template(path = "message.html")]
pub struct MessagePage {
    pub meta: PageMeta,
    pub message: String,
}
