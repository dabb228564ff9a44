use crate::{config::SiteConfig, content::Post};

use super::NOT_FOUND_TITLE;

/// 一个 `<meta>` 标签，`attr` 为 `name` 或 `property`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub attr: &'static str,
    pub key: &'static str,
    pub content: String,
}

/// 页面标题与 meta 标签
///
/// 每次渲染都从站点默认值开始构建，文章页设置的分享信息不会残留到下一个页面。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub tags: Vec<MetaTag>,
}

impl PageMeta {
    /// 站点默认值
    pub fn site(site: &SiteConfig) -> Self {
        let mut meta = Self {
            title: site.title.clone(),
            tags: Vec::new(),
        };

        meta.set("property", "og:type", "website");
        meta.set("property", "og:title", &site.title);
        if !site.description.is_empty() {
            meta.set("name", "description", &site.description);
            meta.set("property", "og:description", &site.description);
        }
        if let Some(image) = site.image.as_deref().filter(|i| !i.is_empty()) {
            meta.set("property", "og:image", image);
        }
        meta
    }

    /// 文章页：标题、描述、Open Graph 与 Twitter 卡片信息均取自文章
    pub fn article(site: &SiteConfig, post: &Post) -> Self {
        let mut meta = Self::site(site);
        meta.title = post.title.clone();

        meta.set("name", "description", &post.description);

        meta.set("property", "og:type", "article");
        meta.set("property", "og:title", &post.title);
        meta.set("property", "og:description", &post.description);
        meta.set("property", "og:image", &post.image);

        meta.set("name", "twitter:card", "summary_large_image");
        meta.set("name", "twitter:title", &post.title);
        meta.set("name", "twitter:description", &post.description);
        meta.set("name", "twitter:image", &post.image);
        meta
    }

    /// 找不到文章
    pub fn not_found(site: &SiteConfig) -> Self {
        let mut meta = Self::site(site);
        meta.title = NOT_FOUND_TITLE.to_string();
        meta.set("property", "og:title", NOT_FOUND_TITLE);
        meta
    }

    /// 在站点默认值上替换标题
    pub fn titled(site: &SiteConfig, title: impl Into<String>) -> Self {
        let mut meta = Self::site(site);
        meta.title = title.into();
        meta
    }

    /// 设置一个标签，已存在时覆盖
    pub fn set(&mut self, attr: &'static str, key: &'static str, content: impl Into<String>) {
        let content = content.into();
        match self.tags.iter_mut().find(|t| t.key == key) {
            Some(tag) => {
                tag.attr = attr;
                tag.content = content;
            }
            None => self.tags.push(MetaTag { attr, key, content }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.content.as_str())
    }
}
