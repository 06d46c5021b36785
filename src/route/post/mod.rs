use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod query;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(i64),
	#[error("unknown user {0}")]
	UnknownUser(String),
	#[error("unknown group {0}")]
	UnknownGroup(i64),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(index, index_docs))
		.api_route("/profile/:username/", get_with(profile, profile_docs))
		.api_route("/posts/:post_id/", get_with(post_detail, post_detail_docs))
		.api_route(
			"/create/",
			get_with(create_page, create_page_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/posts/:post_id/edit/",
			get_with(edit_page, edit_page_docs).post_with(edit_post, edit_post_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownUser(..) => StatusCode::NOT_FOUND,
			Self::UnknownGroup(..) => StatusCode::BAD_REQUEST,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", *post)
				.into_vec(),
			Self::UnknownUser(username) => error::Message::new("unknown_user")
				.detail("username", username.as_str())
				.into_vec(),
			Self::UnknownGroup(group) => error::Message::new("unknown_group")
				.field("group")
				.detail("group", *group)
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use axum::http::StatusCode;
	use serde_json::Value;

	use crate::test::*;

	use super::query;

	async fn thirteen_posts() -> (Database, User, Group) {
		let database = database().await;
		let user = create_user(&database, "testuser").await;
		let group = create_group(&database, "test-slug").await;

		for i in 0..13 {
			create_post(&database, &user, &format!("Test post {i}"), Some(&group)).await;
		}

		(database, user, group)
	}

	#[tokio::test]
	async fn test_listings_paginate_by_ten() {
		let (database, ..) = thirteen_posts().await;
		let app = app(database);

		for path in ["/", "/group/test-slug/", "/profile/testuser/"] {
			let first = app.get(path).await;

			assert_eq!(first.status_code(), StatusCode::OK, "{path}");

			let first = first.json::<Value>();

			assert_eq!(first["page_obj"]["items"].as_array().unwrap().len(), 10, "{path}");
			assert_eq!(first["page_obj"]["count"], 13, "{path}");
			assert_eq!(first["page_obj"]["has_next"], true, "{path}");

			let second = app.get(path).add_query_param("page", 2).await.json::<Value>();

			assert_eq!(second["page_obj"]["items"].as_array().unwrap().len(), 3, "{path}");
			assert_eq!(second["page_obj"]["has_next"], false, "{path}");
			assert_eq!(second["page_obj"]["has_previous"], true, "{path}");
		}
	}

	#[tokio::test]
	async fn test_page_numbers_are_normalized() {
		let (database, ..) = thirteen_posts().await;
		let app = app(database);

		for (page, expected) in [("0", 1), ("-1", 1), ("abc", 1), ("2", 2), ("99", 2)] {
			let response = app.get("/").add_query_param("page", page).await;

			assert_eq!(response.status_code(), StatusCode::OK);
			assert_eq!(response.json::<Value>()["page_obj"]["number"], expected, "{page}");
		}
	}

	#[tokio::test]
	async fn test_profile_and_detail_count_posts() {
		let (database, user, group) = thirteen_posts().await;
		let post = create_post(&database, &user, "The latest post", None).await;
		let app = app(database);

		let profile = app.get("/profile/testuser/").await.json::<Value>();

		assert_eq!(profile["posts_count"], 14);
		assert_eq!(profile["profile"]["username"], "testuser");
		assert!(profile["profile"].get("password").is_none());
		assert_eq!(profile["page_obj"]["items"][0]["id"], post.id);

		let detail = app.get(&format!("/posts/{}/", post.id)).await.json::<Value>();

		assert_eq!(detail["post"]["text"], "The latest post");
		assert_eq!(detail["author"]["username"], "testuser");
		assert_eq!(detail["group"], Value::Null);
		assert_eq!(detail["posts_count"], 14);

		let grouped = app.get("/").await.json::<Value>()["page_obj"]["items"][1]["id"].clone();
		let detail = app.get(&format!("/posts/{grouped}/")).await.json::<Value>();

		assert_eq!(detail["group"]["slug"], group.slug);
	}

	#[tokio::test]
	async fn test_unknown_records_are_not_found() {
		let database = database().await;
		let app = app(database);

		for path in ["/unexisting/", "/posts/1/", "/posts/abc/", "/profile/nobody/"] {
			assert_eq!(app.get(path).await.status_code(), StatusCode::NOT_FOUND, "{path}");
		}
	}

	#[tokio::test]
	async fn test_create_post_redirects_to_profile() {
		let database = database().await;
		let user = create_user(&database, "testuser").await;
		let group = create_group(&database, "test-slug").await;
		let cookie = login(&database, &user).await;
		let app = app(database.clone());

		let page = app.get("/create/").add_cookie(cookie.clone()).await;

		assert_eq!(page.status_code(), StatusCode::OK);
		assert_eq!(page.json::<Value>()["is_edit"], false);
		assert_eq!(page.json::<Value>()["groups"][0]["slug"], "test-slug");

		let response = app
			.post("/create/")
			.add_cookie(cookie)
			.json(&json!({
				"text": "  New test post  ",
				"group": group.id,
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/profile/testuser/");

		let page = query::list_posts(&database, query::PostFilter::all(), 1)
			.await
			.unwrap();

		assert_eq!(page.count, 1);
		assert_eq!(page.items[0].text, "New test post");
		assert_eq!(page.items[0].author_id, user.id);
		assert_eq!(page.items[0].group_id, Some(group.id));
	}

	#[tokio::test]
	async fn test_create_post_rejects_invalid_input() {
		let database = database().await;
		let user = create_user(&database, "testuser").await;
		let cookie = login(&database, &user).await;
		let app = app(database.clone());

		let response = app
			.post("/create/")
			.add_cookie(cookie.clone())
			.json(&json!({ "text": " a " }))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "text");

		let response = app
			.post("/create/")
			.add_cookie(cookie)
			.json(&json!({ "text": "Test post", "group": 42 }))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "group");

		assert_eq!(query::count_by_author(&database, user.id).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_anonymous_is_sent_to_login() {
		let database = database().await;
		let user = create_user(&database, "testuser").await;
		let post = create_post(&database, &user, "Test post", None).await;
		let app = app(database.clone());

		let response = app.get("/create/").await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/auth/login/?next=%2Fcreate%2F");

		let response = app.post("/create/").json(&json!({ "text": "" })).await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/auth/login/?next=%2Fcreate%2F");

		// No body at all is still a login redirect, not a body rejection
		let response = app.post("/create/").await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/auth/login/?next=%2Fcreate%2F");

		let edit = format!("/posts/{}/edit/", post.id);
		let login_location = format!("/auth/login/?next=%2Fposts%2F{}%2Fedit%2F", post.id);

		let response = app.post(&edit).json(&json!({ "text": "Changed" })).await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), login_location.as_str());

		let response = app.post(&edit).await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), login_location.as_str());

		assert_eq!(query::count_by_author(&database, user.id).await.unwrap(), 1);

		let stored = query::find_post(&database, post.id).await.unwrap().unwrap();

		assert_eq!(stored.text, "Test post");
	}

	#[tokio::test]
	async fn test_author_edits_post() {
		let database = database().await;
		let user = create_user(&database, "testuser").await;
		let group = create_group(&database, "test-slug").await;
		let post = create_post(&database, &user, "Test post", None).await;
		let cookie = login(&database, &user).await;
		let app = app(database.clone());

		let edit = format!("/posts/{}/edit/", post.id);
		let page = app.get(&edit).add_cookie(cookie.clone()).await;

		assert_eq!(page.status_code(), StatusCode::OK);

		let context = page.json::<Value>();

		assert_eq!(context["is_edit"], true);
		assert_eq!(context["form"]["text"], "Test post");
		assert_eq!(context["post"]["id"], post.id);

		let response = app
			.post(&edit)
			.add_cookie(cookie)
			.json(&json!({ "text": "Edited test post", "group": group.id }))
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), format!("/posts/{}/", post.id).as_str());

		let stored = query::find_post(&database, post.id).await.unwrap().unwrap();

		assert_eq!(stored.text, "Edited test post");
		assert_eq!(stored.group_id, Some(group.id));
		assert_eq!(stored.pub_date, post.pub_date);
		assert_eq!(stored.author_id, post.author_id);
		assert_eq!(query::count_by_author(&database, user.id).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_invalid_edit_keeps_post() {
		let database = database().await;
		let user = create_user(&database, "testuser").await;
		let post = create_post(&database, &user, "Test post", None).await;
		let cookie = login(&database, &user).await;

		let response = app(database.clone())
			.post(&format!("/posts/{}/edit/", post.id))
			.add_cookie(cookie)
			.json(&json!({ "text": "x" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

		let stored = query::find_post(&database, post.id).await.unwrap().unwrap();

		assert_eq!(stored, post);
	}

	#[tokio::test]
	async fn test_non_author_is_sent_to_detail() {
		let database = database().await;
		let author = create_user(&database, "author").await;
		let other = create_user(&database, "other").await;
		let post = create_post(&database, &author, "Test post", None).await;
		let cookie = login(&database, &other).await;
		let app = app(database.clone());

		let edit = format!("/posts/{}/edit/", post.id);
		let detail = format!("/posts/{}/", post.id);

		let response = app.get(&edit).add_cookie(cookie.clone()).await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), detail.as_str());

		let response = app
			.post(&edit)
			.add_cookie(cookie.clone())
			.json(&json!({ "text": "Hijacked" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), detail.as_str());

		// Bodies that would be rejected are never looked at for a non-author
		let response = app
			.post(&edit)
			.add_cookie(cookie.clone())
			.json(&json!({ "group": 1 }))
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), detail.as_str());

		let response = app.post(&edit).add_cookie(cookie).await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), detail.as_str());

		let stored = query::find_post(&database, post.id).await.unwrap().unwrap();

		assert_eq!(stored, post);
		assert_eq!(query::count_by_author(&database, other.id).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_editing_unknown_post_is_not_found() {
		let database = database().await;
		let user = create_user(&database, "testuser").await;
		let cookie = login(&database, &user).await;
		let app = app(database.clone());

		let response = app.get("/posts/42/edit/").add_cookie(cookie.clone()).await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "unknown_post");

		let response = app
			.post("/posts/42/edit/")
			.add_cookie(cookie)
			.json(&json!({ "text": "Edited test post" }))
			.await;

		assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
		assert_eq!(response.json::<Value>()["errors"][0]["details"]["post"], 42);
		assert_eq!(query::count_by_author(&database, user.id).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_author_without_body_gets_rejection() {
		let database = database().await;
		let user = create_user(&database, "testuser").await;
		let post = create_post(&database, &user, "Test post", None).await;
		let cookie = login(&database, &user).await;
		let app = app(database.clone());

		let response = app.post("/create/").add_cookie(cookie.clone()).await;

		assert_eq!(response.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

		let response = app
			.post(&format!("/posts/{}/edit/", post.id))
			.add_cookie(cookie)
			.json(&json!({ "group": null }))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

		let stored = query::find_post(&database, post.id).await.unwrap().unwrap();

		assert_eq!(stored, post);
	}
}
