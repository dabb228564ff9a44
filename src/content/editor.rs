use super::{NewPost, Post, PostChanges, PostForm, slugify};

/// 管理页面的表单状态
///
/// 同一时间最多只有一个正在编辑的文章（`Editing`）。
/// 新建状态下 slug 随标题重新生成；编辑状态下 slug 固定为已存储的值。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Editor {
    Creating { form: PostForm, slug: String },
    Editing { slug: String, form: PostForm },
}

/// 表单校验失败的原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Vui lòng nhập {0}.")]
    Missing(&'static str),

    #[error("Tiêu đề phải chứa ít nhất một chữ cái hoặc chữ số.")]
    EmptySlug,
}

impl Editor {
    /// 空白的新建表单
    pub fn blank() -> Self {
        Self::Creating {
            form: PostForm::default(),
            slug: String::new(),
        }
    }

    /// 以用户填写的表单进入新建状态，slug 由标题生成
    pub fn creating(form: PostForm) -> Self {
        let slug = slugify(&form.title);
        Self::Creating { form, slug }
    }

    /// 选中一篇已有文章进入编辑状态
    pub fn editing(post: &Post) -> Self {
        Self::Editing {
            slug: post.slug.clone(),
            form: PostForm::from(post),
        }
    }

    /// 以提交的表单停留在对某个 slug 的编辑状态
    pub fn editing_with(slug: impl Into<String>, form: PostForm) -> Self {
        Self::Editing {
            slug: slug.into(),
            form,
        }
    }

    pub fn form(&self) -> &PostForm {
        match self {
            Self::Creating { form, .. } | Self::Editing { form, .. } => form,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Self::Creating { slug, .. } | Self::Editing { slug, .. } => slug,
        }
    }

    /// 正在编辑的文章 slug
    pub fn editing_slug(&self) -> Option<&str> {
        match self {
            Self::Editing { slug, .. } => Some(slug),
            Self::Creating { .. } => None,
        }
    }

    /// 校验必填字段
    ///
    /// `require_external_url` 为真时跳转链接也是必填项。
    pub fn validate(&self, require_external_url: bool) -> Result<(), FormError> {
        let form = self.form();

        let required = [
            ("tiêu đề", &form.title),
            ("mô tả", &form.description),
            ("link ảnh", &form.image),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(FormError::Missing(name));
            }
        }

        if require_external_url && form.external_url.trim().is_empty() {
            return Err(FormError::Missing("link chuyển hướng"));
        }

        if self.slug().is_empty() {
            return Err(FormError::EmptySlug);
        }

        Ok(())
    }

    /// 提交表单时要执行的写操作
    pub fn submission(&self) -> Submission {
        match self {
            Self::Creating { form, slug } => {
                Submission::Insert(form.clone().into_new_post(slug.clone()))
            }
            Self::Editing { slug, form } => Submission::Update {
                slug: slug.clone(),
                changes: form.clone().into_changes(),
            },
        }
    }
}

/// 表单提交对应的写操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// 新建文章
    Insert(NewPost),
    /// 按固定的 slug 更新文章
    Update { slug: String, changes: PostChanges },
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn form(title: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            description: "mô tả".to_string(),
            image: "https://img.example/a.png".to_string(),
            external_url: String::new(),
        }
    }

    fn stored(slug: &str) -> Post {
        Post {
            id: 1,
            created_at: Utc::now(),
            title: "Bài cũ".to_string(),
            description: "cũ".to_string(),
            image: "https://img.example/old.png".to_string(),
            slug: slug.to_string(),
            external_url: Some("https://example.com".to_string()),
        }
    }

    #[test]
    fn test_creating_derives_slug_from_title() {
        let editor = Editor::creating(form("Tin Nóng Hôm Nay"));
        assert_eq!(editor.slug(), "tin-nong-hom-nay");
        assert_eq!(editor.editing_slug(), None);

        assert_eq!(Editor::creating(form("Tin mới")).slug(), "tin-moi");
    }

    #[test]
    fn test_editing_freezes_slug() {
        let post = stored("bai-cu");
        let editor = Editor::editing(&post);
        assert_eq!(editor.editing_slug(), Some("bai-cu"));
        assert_eq!(editor.form().external_url, "https://example.com");

        // 提交的新标题不会改变 slug
        let editor = Editor::editing_with(&post.slug, form("Một tiêu đề hoàn toàn khác"));
        assert_eq!(editor.slug(), "bai-cu");
        assert_eq!(editor.form().title, "Một tiêu đề hoàn toàn khác");

        let Submission::Update { slug, changes } = editor.submission() else {
            panic!("编辑状态应提交更新");
        };
        assert_eq!(slug, "bai-cu");
        assert_eq!(changes.title, "Một tiêu đề hoàn toàn khác");
    }

    #[test]
    fn test_validate_required_fields() {
        let mut missing = form("Tiêu đề");
        missing.image.clear();
        assert_eq!(
            Editor::creating(missing).validate(false),
            Err(FormError::Missing("link ảnh"))
        );

        assert_eq!(Editor::creating(form("Tiêu đề")).validate(false), Ok(()));
        assert_eq!(
            Editor::creating(form("Tiêu đề")).validate(true),
            Err(FormError::Missing("link chuyển hướng"))
        );
        assert_eq!(
            Editor::creating(form("???")).validate(false),
            Err(FormError::EmptySlug)
        );
    }

    #[test]
    fn test_new_post_carries_derived_slug() {
        let Submission::Insert(new_post) = Editor::creating(form("Xin chào")).submission() else {
            panic!("新建状态应提交插入");
        };
        assert_eq!(new_post.slug, "xin-chao");
        assert_eq!(new_post.external_url, None);
    }
}
