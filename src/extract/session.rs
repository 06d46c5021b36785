use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts, OriginalUri},
	http::{header, request},
};

use uuid::Uuid;

use crate::{
	error::RouteError,
	openapi::SECURITY_SCHEME_SESSION,
	route::{auth, Render},
	session, Database,
};

/// Extracts the session and related user from the request.
///
/// Anonymous requests (no cookie, or a cookie that does not name a live session)
/// are rejected with [`auth::Error::LoginRequired`], which sends the client to the
/// login page and back to the original path afterwards.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: auth::model::User,
}

/// The path (and query) the client asked for, before any nesting was stripped.
fn requested_path(parts: &request::Parts) -> String {
	let uri = parts
		.extensions
		.get::<OriginalUri>()
		.map_or(&parts.uri, |original| &original.0);

	uri.path_and_query()
		.map_or_else(|| uri.path().to_owned(), |path| path.as_str().to_owned())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	/// Extracts the session from the request using the session cookie.
	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let login_required = || auth::Error::LoginRequired {
			next: requested_path(parts),
		};

		let cookies = parts
			.headers
			.get_all(header::COOKIE)
			.into_iter()
			.filter_map(|value| value.to_str().ok());

		let session_id = cookies
			.flat_map(cookie::Cookie::split_parse)
			.filter_map(Result::ok)
			.find(|cookie| cookie.name() == session::COOKIE_NAME)
			.and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
			.ok_or_else(login_required)?;

		let database = Database::from_ref(state);
		let user = sqlx::query_as::<_, auth::model::User>(
			r#"
				SELECT * FROM "user" WHERE id = (
					SELECT user_id FROM session WHERE id = ?
				)
			"#,
		)
		.bind(session_id)
		.fetch_optional(&database)
		.await?;

		let Some(user) = user else {
			tracing::debug!(%session_id, "session cookie does not name a live session");
			return Err(login_required().into());
		};

		Ok(Session {
			id: session_id,
			user,
		})
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a session cookie requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}

/// The user behind the request, if they are logged in.
///
/// Unlike [`Session`], anonymous requests are accepted, so the handler can
/// decide what an anonymous user may do. Database failures are still rejected.
#[derive(Debug)]
pub struct Viewer {
	pub session: Option<Session>,
	path: String,
}

impl Viewer {
	pub fn user(&self) -> Option<&auth::model::User> {
		self.session.as_ref().map(|session| &session.user)
	}

	/// Sends the viewer to the login page, returning to the current page afterwards.
	pub fn login_redirect<T>(&self) -> Render<T> {
		Render::redirect(auth::login_url(&self.path))
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Viewer
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let path = requested_path(parts);

		let session = match Session::from_request_parts(parts, state).await {
			Ok(session) => Some(session),
			Err(RouteError::Route(auth::Error::LoginRequired { .. })) => None,
			Err(error) => return Err(error),
		};

		Ok(Self { session, path })
	}
}

impl OperationInput for Viewer {
	fn operation_input(ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		Session::operation_input(ctx, operation);
	}
}
