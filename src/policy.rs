//! Who may do what.
//!
//! These checks only look at the acting user and the record in question, so
//! they do not care how the user was authenticated. Anonymous viewers are `None`.

use crate::route::{auth::model::User, post::model::Post};

/// Any logged-in user may write posts.
pub fn can_create_post(viewer: Option<&User>) -> bool {
	viewer.is_some()
}

/// Only the author of a post may change it.
pub fn can_edit_post(viewer: Option<&User>, post: &Post) -> bool {
	viewer.is_some_and(|user| user.id == post.author_id)
}

/// Staff may manage groups and other users' posts.
pub fn can_administer(viewer: Option<&User>) -> bool {
	viewer.is_some_and(|user| user.is_staff)
}
