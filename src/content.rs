mod editor;
mod post;
mod slug;

pub use self::{
    editor::{Editor, FormError, Submission},
    post::{NewPost, Post, PostChanges, PostForm},
    slug::slugify,
};
