use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::{ReaderMode, SiteConfig},
    storage::Store,
};

/// 应用程序上下文
///
/// [`AppState`] 封装了存储后端、站点默认信息与文章页展示方式，提供统一访问入口。
#[derive(Clone, FromRef)]
pub struct AppState {
    store: Store,
    site: Arc<SiteConfig>,
    reader: ReaderMode,
}

impl AppState {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(store: impl Into<Store>, site: SiteConfig, reader: ReaderMode) -> Self {
        Self {
            store: store.into(),
            site: Arc::new(site),
            reader,
        }
    }

    /// 获取存储后端
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// 获取站点默认信息
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub fn reader(&self) -> ReaderMode {
        self.reader
    }
}
