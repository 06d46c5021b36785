pub use crate::route::{
	group::model::{Group, GroupForm},
	model::{Page, PageInput},
	post::model::Post,
};

use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct GroupPath {
	pub slug: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct PostPath {
	pub post_id: i64,
}

/// Filters the post listing by text and publication time.
#[derive(Debug, Default, Deserialize, Validate, JsonSchema)]
pub struct SearchInput {
	/// Only posts whose text contains this, ignoring ASCII case.
	#[validate(length(max = 200))]
	pub search: Option<String>,
	/// Only posts published at or after this time.
	pub since: Option<chrono::DateTime<chrono::Utc>>,
	/// Only posts published before this time.
	pub until: Option<chrono::DateTime<chrono::Utc>>,
}

/// Moves a post to another group, or out of any group.
#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PostGroupInput {
	#[serde(default)]
	pub group: Option<i64>,
}
