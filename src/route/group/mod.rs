use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod query;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown group {0}")]
	UnknownGroup(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/group/:slug/", get_with(group_posts, group_posts_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownGroup(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownGroup(slug) => error::Message::new("unknown_group")
				.detail("group", slug.as_str())
				.into_vec(),
		}
	}
}
