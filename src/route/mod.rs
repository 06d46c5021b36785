use aide::{
	axum::ApiRouter,
	gen::GenContext,
	openapi::{Operation, Response as ApiResponse},
	OperationOutput,
};
use axum::response::{IntoResponse, Redirect, Response};

use crate::{extract::Json, AppState};

pub mod admin;
pub mod auth;
pub mod docs;
pub mod group;
pub mod model;
pub mod post;

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new()
		.merge(post::routes())
		.merge(group::routes())
		.nest("/auth", auth::routes())
		.nest("/admin", admin::routes())
}

/// The outcome of a page handler: either a context for the presentation
/// layer to render, or a redirect to another page.
#[derive(Debug)]
pub enum Render<T> {
	Context(T),
	Redirect(String),
}

impl<T> Render<T> {
	pub fn redirect(location: impl Into<String>) -> Self {
		Self::Redirect(location.into())
	}
}

impl<T: serde::Serialize> IntoResponse for Render<T> {
	fn into_response(self) -> Response {
		match self {
			Self::Context(context) => Json(context).into_response(),
			Self::Redirect(location) => Redirect::to(&location).into_response(),
		}
	}
}

impl<T> OperationOutput for Render<T>
where
	Json<T>: OperationOutput,
{
	type Inner = T;

	fn operation_response(ctx: &mut GenContext, operation: &mut Operation) -> Option<ApiResponse> {
		Json::<T>::operation_response(ctx, operation)
	}

	fn inferred_responses(
		ctx: &mut GenContext,
		operation: &mut Operation,
	) -> Vec<(Option<u16>, ApiResponse)> {
		Json::<T>::inferred_responses(ctx, operation)
	}
}
