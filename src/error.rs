use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
	extract::rejection,
	http::StatusCode,
	response::{IntoResponse, Redirect, Response},
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message presented to the client.
///
/// `content` is a stable, machine-readable code (e.g. `unknown_post`),
/// `field` names the offending input field for validation errors.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	pub content: Cow<'a, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse<'a> {
	pub errors: Vec<Message<'a>>,
}

/// Describes how a route-specific error is presented to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn errors(&self) -> Vec<Message<'_>>;

	/// If set, the client is sent to this location instead of receiving an error body.
	fn redirect(&self) -> Option<String> {
		None
	}
}

/// Errors that can occur in any route, regardless of its domain.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

impl AppError {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Query(..) => StatusCode::BAD_REQUEST,
			Self::Json(rejection) => rejection.status(),
			// A path segment that does not parse (e.g. `/posts/abc/`) names nothing
			Self::Path(..) => StatusCode::NOT_FOUND,
			Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn errors(&self) -> Vec<Message<'_>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors.iter().map(move |error| {
						Message::new(
							error
								.message
								.as_deref()
								.unwrap_or(error.code.as_ref())
								.to_owned(),
						)
						.field(field)
					})
				})
				.collect(),
			Self::Json(rejection) => Message::new(rejection.body_text()).into_vec(),
			Self::Query(rejection) => Message::new(rejection.body_text()).into_vec(),
			Self::Path(..) => Message::new("not_found").into_vec(),
			Self::Database(..) => Vec::new(),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		}

		(
			status,
			Json(ErrorResponse {
				errors: self.errors(),
			}),
		)
			.into_response()
	}
}

/// The error type returned by route handlers, where `E` is the
/// error type of the route module.
#[derive(Debug)]
pub enum RouteError<E> {
	App(AppError),
	Route(E),
}

impl<E: ErrorShape> From<E> for RouteError<E> {
	fn from(error: E) -> Self {
		Self::Route(error)
	}
}

impl<E> From<AppError> for RouteError<E> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<E> From<sqlx::Error> for RouteError<E> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<E> From<validator::ValidationErrors> for RouteError<E> {
	fn from(errors: validator::ValidationErrors) -> Self {
		Self::App(AppError::Validation(errors))
	}
}

impl<E: ErrorShape> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response {
		let error = match self {
			Self::App(error) => return error.into_response(),
			Self::Route(error) => error,
		};

		if let Some(location) = error.redirect() {
			return Redirect::to(&location).into_response();
		}

		let status = error.status();

		if status.is_server_error() {
			tracing::error!(error = %error, "request failed");
		}

		(
			status,
			Json(ErrorResponse {
				errors: error.errors(),
			}),
		)
			.into_response()
	}
}

impl<E> OperationOutput for RouteError<E> {
	type Inner = Self;
}

/// Response for paths that match no route.
pub async fn fallback() -> impl IntoResponse {
	(
		StatusCode::NOT_FOUND,
		Json(ErrorResponse {
			errors: Message::new("not_found").into_vec(),
		}),
	)
}
