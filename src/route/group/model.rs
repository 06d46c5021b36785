pub use crate::route::model::{Page, PageInput};

use macros::form;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::route::post::model::Post;

/// Slugs may contain letters, digits, hyphens and underscores.
fn validate_slug(slug: &str) -> Result<(), ValidationError> {
	if slug
		.chars()
		.any(|c| !c.is_ascii_alphanumeric() && c != '-' && c != '_')
	{
		let mut error = ValidationError::new("invalid_slug");
		error.message = Some("slug may only contain letters, digits, hyphens and underscores".into());

		return Err(error);
	}

	Ok(())
}

/// A named category that posts may be filed under.
#[form]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Group {
	/// The unique identifier of the group.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The display name of the group.
	#[validate(length(min = 1, max = 200))]
	pub title: String,
	/// The unique, URL-safe name of the group.
	#[validate(length(min = 1, max = 50), custom(function = "validate_slug"))]
	pub slug: String,
	pub description: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct GroupPath {
	pub slug: String,
}

/// The context of a group's page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct GroupContext {
	pub group: Group,
	/// The group's posts, newest first.
	pub page_obj: Page<Post>,
}
