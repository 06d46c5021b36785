use aide::axum::IntoApiResponse;
use argon2::Argon2;
use axum::{
	extract::State,
	http::{header, StatusCode},
};
use macros::route;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::{
	extract::{Json, Query, Session},
	openapi::tag,
	route::Render,
	session, AppState, Database,
};

use super::{is_safe_next, model, Error, RouteError};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, using the user's id as a salt.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Inserts a new user, mapping a taken username to [`Error::UsernameTaken`].
pub async fn create_user(
	conn: &mut SqliteConnection,
	hasher: &Argon2<'_>,
	username: &str,
	password: &str,
	is_staff: bool,
) -> Result<model::User, RouteError> {
	let user_id = Uuid::new_v4();
	let hashed = hash_password(hasher, password, &user_id).map_err(Error::Argon)?;

	sqlx::query_as::<_, model::User>(
		r#"
			INSERT INTO "user" (id, username, password, is_staff) VALUES (?, ?, ?, ?)
			RETURNING *
		"#,
	)
	.bind(user_id)
	.bind(username)
	.bind(&hashed[..])
	.bind(is_staff)
	.fetch_one(conn)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d) if d.is_unique_violation() => Error::UsernameTaken.into(),
		e => RouteError::from(e),
	})
}

/// Makes sure a staff account with the given credentials exists.
///
/// An existing user with the same name is promoted to staff and keeps its password.
pub async fn ensure_staff_user(
	database: &Database,
	hasher: &Argon2<'_>,
	username: &str,
	password: &str,
) -> Result<model::User, RouteError> {
	let mut tx = database.begin().await?;

	let existing = sqlx::query_as::<_, model::User>(
		r#"UPDATE "user" SET is_staff = TRUE WHERE username = ? RETURNING *"#,
	)
	.bind(username)
	.fetch_optional(&mut *tx)
	.await?;

	let user = match existing {
		Some(user) => user,
		None => create_user(&mut *tx, hasher, username, password, true).await?,
	};

	tx.commit().await?;

	Ok(user)
}

async fn start_session(
	conn: &mut SqliteConnection,
	user_id: Uuid,
) -> Result<model::Session, sqlx::Error> {
	sqlx::query_as::<_, model::Session>(
		"INSERT INTO session (id, user_id) VALUES (?, ?) RETURNING *",
	)
	.bind(Uuid::new_v4())
	.bind(user_id)
	.fetch_one(conn)
	.await
}

/// Log in page
/// Returns the context of the login page. Anonymous users are sent here
/// with `next` set to the page they asked for.
#[route(tag = tag::AUTH)]
pub async fn login_page(Query(query): Query<model::LoginQuery>) -> Json<model::LoginContext> {
	Json(model::LoginContext {
		next: query.next.filter(|next| is_safe_next(next)),
	})
}

/// Log in
/// Logs in to an account, returning an associated session cookie. If a local
/// `next` path is given, redirects there instead.
#[route(tag = tag::AUTH, response(status = 200, description = "Logged in successfully.", shape = "Json<model::Session>"))]
pub async fn login(
	State(state): State<AppState>,
	Query(query): Query<model::LoginQuery>,
	Json(auth): Json<model::LoginInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE username = ?"#)
		.bind(&auth.username)
		.fetch_optional(&state.database)
		.await?;

	let Some(user) = user else {
		tracing::debug!(username = %auth.username, "login for unknown user");
		return Err(Error::InvalidUsernameOrPassword.into());
	};

	let hashed = hash_password(&state.hasher, &auth.password, &user.id).map_err(Error::Argon)?;

	if user.password != hashed {
		tracing::debug!(username = %auth.username, "login with wrong password");
		return Err(Error::InvalidUsernameOrPassword.into());
	}

	let mut conn = state.database.acquire().await?;
	let session = start_session(&mut *conn, user.id).await?;
	let cookie = session::create_cookie(session.id);

	tracing::info!(username = %user.username, "user logged in");

	let render = match query.next {
		Some(next) if is_safe_next(&next) => Render::redirect(next),
		_ => Render::Context(session),
	};

	Ok(([(header::SET_COOKIE, cookie.to_string())], render))
}

/// Log out
/// Logs out of the authenticated account and clears the session cookie.
#[route(tag = tag::AUTH, response(status = 204, description = "Logged out successfully."))]
pub async fn logout(
	State(database): State<Database>,
	session: Session,
) -> Result<impl IntoApiResponse, RouteError> {
	sqlx::query("DELETE FROM session WHERE id = ?")
		.bind(session.id)
		.execute(&database)
		.await?;

	// Clear the session cookie
	Ok((
		[(header::SET_COOKIE, session::clear_cookie().to_string())],
		StatusCode::NO_CONTENT,
	))
}

/// Sign up
/// Registers a new account, returning an associated session cookie.
#[route(tag = tag::AUTH, response(status = 200, description = "Registered successfully.", shape = "Json<model::Session>"))]
pub async fn signup(
	State(state): State<AppState>,
	Json(auth): Json<model::SignupInput>,
) -> Result<impl IntoApiResponse, RouteError> {
	let mut tx = state.database.begin().await?;

	let user = create_user(&mut *tx, &state.hasher, &auth.username, &auth.password, false).await?;
	let session = start_session(&mut *tx, user.id).await?;

	tx.commit().await?;

	tracing::info!(username = %user.username, "user signed up");

	let cookie = session::create_cookie(session.id);

	Ok(([(header::SET_COOKIE, cookie.to_string())], Json(session)))
}

/// Get user
/// Returns the authenticated user.
#[route(tag = tag::AUTH)]
pub async fn get_me(session: Session) -> Json<model::User> {
	Json(session.user)
}
