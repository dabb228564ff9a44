use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 已存储的文章记录
///
/// `id` 与 `created_at` 由存储端分配，`slug` 是对外的唯一标识。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub image: String,
    pub slug: String,
    /// 跳转模式下的目标链接
    #[serde(rename = "externalUrl", default)]
    #[sqlx(rename = "externalUrl")]
    pub external_url: Option<String>,
}

impl Post {
    /// 非空的跳转链接
    pub fn redirect_target(&self) -> Option<&str> {
        self.external_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// 新建文章时写入的字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub image: String,
    pub slug: String,
    #[serde(rename = "externalUrl")]
    pub external_url: Option<String>,
}

/// 更新文章时写入的字段
///
/// 不包含 `slug`：slug 一经创建便不再改变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostChanges {
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "externalUrl")]
    pub external_url: Option<String>,
}

/// 管理页面表单提交的可编辑字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "externalUrl")]
    pub external_url: String,
}

impl PostForm {
    fn external_url(&self) -> Option<String> {
        let url = self.external_url.trim();
        (!url.is_empty()).then(|| url.to_string())
    }

    pub fn into_new_post(self, slug: String) -> NewPost {
        NewPost {
            external_url: self.external_url(),
            title: self.title,
            description: self.description,
            image: self.image,
            slug,
        }
    }

    pub fn into_changes(self) -> PostChanges {
        PostChanges {
            external_url: self.external_url(),
            title: self.title,
            description: self.description,
            image: self.image,
        }
    }
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            description: post.description.clone(),
            image: post.image.clone(),
            external_url: post.external_url.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_deserializes_store_row() {
        let row = r#"{
            "id": 7,
            "created_at": "2025-03-01T08:30:00.123456+00:00",
            "title": "Tin Nóng Hôm Nay",
            "description": "mô tả",
            "image": "https://img.example/1.png",
            "slug": "tin-nong-hom-nay",
            "externalUrl": null
        }"#;

        let post: Post = serde_json::from_str(row).expect("反序列化失败");
        assert_eq!(post.id, 7);
        assert_eq!(post.slug, "tin-nong-hom-nay");
        assert_eq!(post.external_url, None);
        assert_eq!(post.redirect_target(), None);
    }

    #[test]
    fn test_blank_external_url_is_not_a_redirect_target() {
        let form = PostForm {
            title: "a".into(),
            description: "b".into(),
            image: "c".into(),
            external_url: "   ".into(),
        };
        assert_eq!(form.into_changes().external_url, None);
    }

    #[test]
    fn test_changes_payload_has_no_slug() {
        let changes = PostForm {
            title: "t".into(),
            description: "d".into(),
            image: "i".into(),
            external_url: "https://example.com".into(),
        }
        .into_changes();

        let json = serde_json::to_value(&changes).unwrap();
        assert!(json.get("slug").is_none());
        assert_eq!(json["externalUrl"], "https://example.com");
    }
}
