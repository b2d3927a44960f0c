//! Posts and the activity attached to them.

use serde::{Deserialize, Serialize};

use super::{required, Entity, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub group_id: String,
    pub author_id: String,
    pub content: String,
}

impl Entity for Post {
    const COLLECTION: &'static str = "post";
}

impl Post {
    pub const GROUP_ID: &'static str = "group_id";
}

#[derive(Debug, Default, Deserialize)]
pub struct NewPost {
    pub group_id: Option<String>,
    pub author_id: Option<String>,
    pub content: Option<String>,
}

impl TryFrom<NewPost> for Post {
    type Error = ValidationError;

    fn try_from(input: NewPost) -> Result<Self, Self::Error> {
        Ok(Self {
            group_id: required(input.group_id, "group_id")?,
            author_id: required(input.author_id, "author_id")?,
            content: required(input.content, "content")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub post_id: String,
    pub author_id: String,
    pub content: String,
}

impl Entity for Comment {
    const COLLECTION: &'static str = "comment";
}

impl Comment {
    pub const POST_ID: &'static str = "post_id";
}

#[derive(Debug, Default, Deserialize)]
pub struct NewComment {
    pub post_id: Option<String>,
    pub author_id: Option<String>,
    pub content: Option<String>,
}

impl TryFrom<NewComment> for Comment {
    type Error = ValidationError;

    fn try_from(input: NewComment) -> Result<Self, Self::Error> {
        Ok(Self {
            post_id: required(input.post_id, "post_id")?,
            author_id: required(input.author_id, "author_id")?,
            content: required(input.content, "content")?,
        })
    }
}

/// A user liking a post. The same pair may be stored more than once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub post_id: String,
    pub user_id: String,
}

impl Entity for Like {
    const COLLECTION: &'static str = "like";
}

impl Like {
    pub const POST_ID: &'static str = "post_id";
}

#[derive(Debug, Default, Deserialize)]
pub struct NewLike {
    pub post_id: Option<String>,
    pub user_id: Option<String>,
}

impl TryFrom<NewLike> for Like {
    type Error = ValidationError;

    fn try_from(input: NewLike) -> Result<Self, Self::Error> {
        Ok(Self {
            post_id: required(input.post_id, "post_id")?,
            user_id: required(input.user_id, "user_id")?,
        })
    }
}
