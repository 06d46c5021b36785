pub use crate::route::model::{Page, PageInput};

use macros::form;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::route::{auth::model::User, group::model::Group};

/// Posts must say something: at least 2 characters once surrounding whitespace is removed.
fn validate_text(text: &str) -> Result<(), ValidationError> {
	if text.trim().chars().count() < 2 {
		let mut error = ValidationError::new("text_too_short");
		error.message = Some("a post must contain at least 2 characters".into());

		return Err(error);
	}

	Ok(())
}

/// A single post, written by a user and optionally filed under a group.
#[form]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The text of the post.
	#[validate(custom(function = "validate_text"))]
	pub text: String,
	/// The creation time of the post. It never changes.
	#[serde(skip_deserializing)]
	pub pub_date: chrono::DateTime<chrono::Utc>,
	/// The user that wrote the post.
	#[serde(skip_deserializing, rename = "author")]
	pub author_id: Uuid,
	/// The group the post is filed under, if any.
	#[serde(default, rename = "group")]
	pub group_id: Option<i64>,
}

impl From<&Post> for PostForm {
	fn from(post: &Post) -> Self {
		Self {
			text: post.text.clone(),
			group_id: post.group_id,
		}
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct PostPath {
	pub post_id: i64,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct ProfilePath {
	pub username: String,
}

/// The context of the front page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct IndexContext {
	/// All posts, newest first.
	pub page_obj: Page<Post>,
}

/// The context of a user's profile page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ProfileContext {
	pub profile: User,
	/// The user's posts, newest first.
	pub page_obj: Page<Post>,
	/// The total number of posts the user has written.
	pub posts_count: i64,
}

/// The context of a single post's page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct DetailContext {
	pub post: Post,
	pub author: User,
	pub group: Option<Group>,
	/// The total number of posts the author has written.
	pub posts_count: i64,
}

/// The context of the page for writing or editing a post.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostFormContext {
	/// The values to fill the form with.
	pub form: PostForm,
	/// The groups a post may be filed under.
	pub groups: Vec<Group>,
	pub is_edit: bool,
	/// The post being edited.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub post: Option<Post>,
}
