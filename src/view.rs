mod meta;
mod pages;

use askama::Template;
use axum::response::Html;

use crate::error::Result;

pub use self::{
    meta::{MetaTag, PageMeta},
    pages::{AdminPage, ConfirmDeletePage, MessagePage, PostPage},
};

/// 文章页找不到文章时的提示
pub const ARTICLE_NOT_FOUND: &str = "404 - Không tìm thấy bài viết bạn yêu cầu.";
/// 跳转页找不到文章或跳转链接时的提示
pub const REDIRECT_NOT_FOUND: &str =
    "404 - Không tìm thấy bài viết hoặc không có link chuyển hướng.";
/// 找不到文章时的页面标题
pub const NOT_FOUND_TITLE: &str = "Không tìm thấy bài viết";
/// 删除前的确认提示
pub const CONFIRM_DELETE: &str = "Bạn có chắc chắn muốn xóa bài viết này không?";
/// 存储端错误提示的前缀
pub const STORE_ERROR_PREFIX: &str = "Lỗi từ cơ sở dữ liệu: ";

/// 渲染模板为 HTML 响应体
pub fn render(template: &impl Template) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}
