use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

pub const LOGIN_PATH: &str = "/auth/login/";

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid username or password")]
	InvalidUsernameOrPassword,
	#[error("password hashing error")]
	Argon(#[from] argon2::Error),
	#[error("login required")]
	LoginRequired { next: String },
	#[error("username already taken")]
	UsernameTaken,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/signup/", post_with(signup, signup_docs))
		.api_route(
			"/login/",
			get_with(login_page, login_page_docs).post_with(login, login_docs),
		)
		.api_route("/logout/", post_with(logout, logout_docs))
		.api_route("/me/", get_with(get_me, get_me_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidUsernameOrPassword => StatusCode::UNAUTHORIZED,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::LoginRequired { .. } => StatusCode::SEE_OTHER,
			Self::UsernameTaken => StatusCode::CONFLICT,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::Argon(..) => Vec::new(),
			Self::UsernameTaken => error::Message::new(self.to_string())
				.field("username")
				.into_vec(),
			_ => error::Message::new(self.to_string()).into_vec(),
		}
	}

	fn redirect(&self) -> Option<String> {
		match self {
			Self::LoginRequired { next } => Some(login_url(next)),
			_ => None,
		}
	}
}

/// The login page, remembering where to go afterwards.
pub fn login_url(next: &str) -> String {
	let query = model::LoginQuery {
		next: Some(next.to_owned()),
	};

	match serde_urlencoded::to_string(&query) {
		Ok(query) => format!("{LOGIN_PATH}?{query}"),
		Err(error) => {
			tracing::warn!(%error, next, "could not encode the login redirect");
			LOGIN_PATH.to_owned()
		}
	}
}

/// Only local absolute paths are followed after logging in.
pub fn is_safe_next(next: &str) -> bool {
	next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
}
