use aide::{
	axum::{
		routing::{get_with, patch_with, put_with},
		ApiRouter,
	},
	OperationInput,
};
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{request, StatusCode},
};

use crate::{error, extract::Session, policy, route::auth, AppState, Database};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Auth(#[from] auth::Error),
	#[error("staff only")]
	Forbidden,
	#[error("unknown group {0}")]
	UnknownGroup(String),
	#[error("unknown post {0}")]
	UnknownPost(i64),
	#[error("unknown group {0}")]
	InvalidGroup(i64),
	#[error("slug already taken")]
	SlugTaken,
	#[error("group {slug} still has {posts} posts")]
	GroupInUse { slug: String, posts: i64 },
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/groups/",
			get_with(list_groups, list_groups_docs).post_with(create_group, create_group_docs),
		)
		.api_route(
			"/groups/:slug/",
			put_with(update_group, update_group_docs).delete_with(delete_group, delete_group_docs),
		)
		.api_route("/posts/", get_with(list_posts, list_posts_docs))
		.api_route(
			"/posts/:post_id/",
			patch_with(update_post_group, update_post_group_docs)
				.delete_with(delete_post, delete_post_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::Auth(inner) => error::ErrorShape::status(inner),
			Self::Forbidden => StatusCode::FORBIDDEN,
			Self::UnknownGroup(..) | Self::UnknownPost(..) => StatusCode::NOT_FOUND,
			Self::InvalidGroup(..) => StatusCode::BAD_REQUEST,
			Self::SlugTaken | Self::GroupInUse { .. } => StatusCode::CONFLICT,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::Auth(inner) => error::ErrorShape::errors(inner),
			Self::Forbidden => error::Message::new("forbidden").into_vec(),
			Self::UnknownGroup(slug) => error::Message::new("unknown_group")
				.detail("group", slug.as_str())
				.into_vec(),
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", *post)
				.into_vec(),
			Self::InvalidGroup(group) => error::Message::new("unknown_group")
				.field("group")
				.detail("group", *group)
				.into_vec(),
			Self::SlugTaken => error::Message::new("slug_taken").field("slug").into_vec(),
			Self::GroupInUse { slug, posts } => error::Message::new("group_in_use")
				.detail("group", slug.as_str())
				.detail("posts", *posts)
				.into_vec(),
		}
	}

	fn redirect(&self) -> Option<String> {
		match self {
			Self::Auth(inner) => error::ErrorShape::redirect(inner),
			_ => None,
		}
	}
}

/// A session belonging to a staff user.
#[derive(Debug)]
pub struct Staff(pub Session);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Staff
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let session = match Session::from_request_parts(parts, state).await {
			Ok(session) => session,
			Err(error::RouteError::App(e)) => return Err(e.into()),
			Err(error::RouteError::Route(e)) => return Err(Error::Auth(e).into()),
		};

		if !policy::can_administer(Some(&session.user)) {
			tracing::debug!(username = %session.user.username, "admin access by non-staff user");
			return Err(Error::Forbidden.into());
		}

		Ok(Self(session))
	}
}

impl OperationInput for Staff {
	fn operation_input(ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		Session::operation_input(ctx, operation);
	}
}

#[cfg(test)]
mod test {
	use axum::http::StatusCode;
	use serde_json::Value;

	use crate::{route::post::query, test::*};

	async fn staff(database: &Database) -> cookie::Cookie<'static> {
		let user = create_user(database, "admin").await;

		sqlx::query(r#"UPDATE "user" SET is_staff = TRUE WHERE id = ?"#)
			.bind(user.id)
			.execute(database)
			.await
			.unwrap();

		login(database, &user).await
	}

	#[tokio::test]
	async fn test_non_staff_are_turned_away() {
		let database = database().await;
		let user = create_user(&database, "testuser").await;
		let cookie = login(&database, &user).await;
		let app = app(database);

		let response = app.get("/admin/groups/").await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/auth/login/?next=%2Fadmin%2Fgroups%2F");

		let response = app.get("/admin/groups/").add_cookie(cookie).await;

		assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "forbidden");
	}

	#[tokio::test]
	async fn test_group_management() {
		let database = database().await;
		let cookie = staff(&database).await;
		let app = app(database);

		let group = json!({
			"title": "Test group",
			"slug": "test-slug",
			"description": "Test description",
		});

		let response = app.post("/admin/groups/").add_cookie(cookie.clone()).json(&group).await;

		assert_eq!(response.status_code(), StatusCode::CREATED);
		assert_eq!(response.json::<Value>()["slug"], "test-slug");

		let response = app.post("/admin/groups/").add_cookie(cookie.clone()).json(&group).await;

		assert_eq!(response.status_code(), StatusCode::CONFLICT);

		let response = app
			.put("/admin/groups/test-slug/")
			.add_cookie(cookie.clone())
			.json(&json!({
				"title": "Renamed group",
				"slug": "renamed",
				"description": "",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(app.get("/group/renamed/").await.status_code(), StatusCode::OK);
		assert_eq!(app.get("/group/test-slug/").await.status_code(), StatusCode::NOT_FOUND);

		let response = app.get("/admin/groups/").add_cookie(cookie).await;

		assert_eq!(response.json::<Value>()[0]["title"], "Renamed group");
	}

	#[tokio::test]
	async fn test_group_in_use_is_kept() {
		let database = database().await;
		let cookie = staff(&database).await;
		let user = create_user(&database, "testuser").await;
		let group = create_group(&database, "test-slug").await;
		let post = create_post(&database, &user, "Test post", Some(&group)).await;
		let app = app(database.clone());

		let response = app.delete("/admin/groups/test-slug/").add_cookie(cookie.clone()).await;

		assert_eq!(response.status_code(), StatusCode::CONFLICT);
		assert_eq!(response.json::<Value>()["errors"][0]["details"]["posts"], 1);

		let response = app
			.patch(&format!("/admin/posts/{}/", post.id))
			.add_cookie(cookie.clone())
			.json(&json!({ "group": null }))
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(response.json::<Value>()["group"], Value::Null);

		let response = app.delete("/admin/groups/test-slug/").add_cookie(cookie).await;

		assert_eq!(response.status_code(), StatusCode::OK);
		assert_eq!(app.get("/group/test-slug/").await.status_code(), StatusCode::NOT_FOUND);

		let stored = query::find_post(&database, post.id).await.unwrap().unwrap();

		assert_eq!(stored.text, post.text);
	}

	#[tokio::test]
	async fn test_post_search_and_delete() {
		let database = database().await;
		let cookie = staff(&database).await;
		let user = create_user(&database, "testuser").await;
		let kept = create_post(&database, &user, "Something else", None).await;
		let doomed = create_post(&database, &user, "A Spam post", None).await;
		let app = app(database.clone());

		let response = app
			.get("/admin/posts/")
			.add_query_param("search", "spam")
			.add_cookie(cookie.clone())
			.await;

		let page = response.json::<Value>();

		assert_eq!(page["count"], 1);
		assert_eq!(page["items"][0]["id"], doomed.id);

		let response = app
			.delete(&format!("/admin/posts/{}/", doomed.id))
			.add_cookie(cookie.clone())
			.await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let response = app
			.delete(&format!("/admin/posts/{}/", doomed.id))
			.add_cookie(cookie)
			.await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(query::count_by_author(&database, user.id).await.unwrap(), 1);
		assert!(query::find_post(&database, kept.id).await.unwrap().is_some());
	}

	#[tokio::test]
	async fn test_post_listing_by_publication_time() {
		let database = database().await;
		let cookie = staff(&database).await;
		let user = create_user(&database, "testuser").await;
		let old = create_post(&database, &user, "Old spam", None).await;
		let recent = create_post(&database, &user, "Recent spam", None).await;

		sqlx::query("UPDATE post SET pub_date = '2023-06-01 08:00:00.000' WHERE id = ?")
			.bind(old.id)
			.execute(&database)
			.await
			.unwrap();

		let app = app(database);

		let page = app
			.get("/admin/posts/")
			.add_query_param("since", "2024-01-01T00:00:00Z")
			.add_cookie(cookie.clone())
			.await
			.json::<Value>();

		assert_eq!(page["count"], 1);
		assert_eq!(page["items"][0]["id"], recent.id);

		let page = app
			.get("/admin/posts/")
			.add_query_param("search", "SPAM")
			.add_query_param("until", "2024-01-01T00:00:00Z")
			.add_cookie(cookie)
			.await
			.json::<Value>();

		assert_eq!(page["count"], 1);
		assert_eq!(page["items"][0]["id"], old.id);
	}
}
