use axum::extract::State;
use macros::route;

use crate::{
	extract::{Deferred, Json, Path, Query, Viewer},
	openapi::tag,
	policy,
	route::{auth, group, Render},
	Database,
};

use super::{
	model,
	query::{self, PostFilter},
	Error, RouteError,
};

/// Checks that the group a post is filed under exists.
async fn check_group(
	conn: &mut sqlx::SqliteConnection,
	group_id: Option<i64>,
) -> Result<(), RouteError> {
	let Some(group_id) = group_id else {
		return Ok(());
	};

	group::query::find_by_id(&mut *conn, group_id)
		.await?
		.ok_or(Error::UnknownGroup(group_id))?;

	Ok(())
}

async fn find_user(database: &Database, username: &str) -> Result<Option<auth::model::User>, sqlx::Error> {
	sqlx::query_as::<_, auth::model::User>(r#"SELECT * FROM "user" WHERE username = ?"#)
		.bind(username)
		.fetch_optional(database)
		.await
}

/// Get all posts
/// Returns a page of all posts, newest first.
#[route(tag = tag::POST)]
pub async fn index(
	State(database): State<Database>,
	Query(page): Query<model::PageInput>,
) -> Result<Json<model::IndexContext>, RouteError> {
	let page_obj = query::list_posts(&database, PostFilter::all(), page.number()).await?;

	Ok(Json(model::IndexContext { page_obj }))
}

/// Get profile
/// Returns a user and a page of the posts they wrote, newest first.
#[route(tag = tag::POST)]
pub async fn profile(
	State(database): State<Database>,
	Path(path): Path<model::ProfilePath>,
	Query(page): Query<model::PageInput>,
) -> Result<Json<model::ProfileContext>, RouteError> {
	let profile = find_user(&database, &path.username)
		.await?
		.ok_or(Error::UnknownUser(path.username))?;

	let page_obj = query::list_posts(&database, PostFilter::author(profile.id), page.number()).await?;

	Ok(Json(model::ProfileContext {
		posts_count: page_obj.count,
		profile,
		page_obj,
	}))
}

/// Get single post
/// Returns a single post by its id, along with its author and group.
#[route(tag = tag::POST)]
pub async fn post_detail(
	State(database): State<Database>,
	Path(path): Path<model::PostPath>,
) -> Result<Json<model::DetailContext>, RouteError> {
	let post = query::find_post(&database, path.post_id)
		.await?
		.ok_or(Error::UnknownPost(path.post_id))?;

	let author = sqlx::query_as::<_, auth::model::User>(r#"SELECT * FROM "user" WHERE id = ?"#)
		.bind(post.author_id)
		.fetch_one(&database)
		.await?;

	let group = match post.group_id {
		Some(group_id) => group::query::find_by_id(&database, group_id).await?,
		None => None,
	};

	let posts_count = query::count_by_author(&database, author.id).await?;

	Ok(Json(model::DetailContext {
		post,
		author,
		group,
		posts_count,
	}))
}

/// New post page
/// Returns an empty form and the groups a new post may be filed under.
#[route(tag = tag::POST)]
pub async fn create_page(
	State(database): State<Database>,
	viewer: Viewer,
) -> Result<Render<model::PostFormContext>, RouteError> {
	if !policy::can_create_post(viewer.user()) {
		return Ok(viewer.login_redirect());
	}

	let groups = group::query::list_all(&database).await?;

	Ok(Render::Context(model::PostFormContext {
		form: model::PostForm {
			text: String::new(),
			group_id: None,
		},
		groups,
		is_edit: false,
		post: None,
	}))
}

/// Create post
/// Writes a new post and redirects to the author's profile.
#[route(tag = tag::POST)]
pub async fn create_post(
	State(database): State<Database>,
	viewer: Viewer,
	form: Deferred<model::PostForm>,
) -> Result<Render<()>, RouteError> {
	let Some(user) = viewer.user().filter(|&user| policy::can_create_post(Some(user))) else {
		return Ok(viewer.login_redirect());
	};

	let form = form.validated()?;

	let mut tx = database.begin().await?;

	check_group(&mut *tx, form.group_id).await?;

	let post = sqlx::query_as::<_, model::Post>(
		"INSERT INTO post (text, author_id, group_id) VALUES (?, ?, ?) RETURNING *",
	)
	.bind(form.text.trim())
	.bind(user.id)
	.bind(form.group_id)
	.fetch_one(&mut *tx)
	.await?;

	tx.commit().await?;

	tracing::info!(post_id = post.id, username = %user.username, "post created");

	Ok(Render::redirect(format!("/profile/{}/", user.username)))
}

/// Edit post page
/// Returns the post's current values and the groups it may be filed under.
/// Anyone but the author is sent to the post's page instead.
#[route(tag = tag::POST)]
pub async fn edit_page(
	State(database): State<Database>,
	viewer: Viewer,
	Path(path): Path<model::PostPath>,
) -> Result<Render<model::PostFormContext>, RouteError> {
	if viewer.user().is_none() {
		return Ok(viewer.login_redirect());
	}

	let post = query::find_post(&database, path.post_id)
		.await?
		.ok_or(Error::UnknownPost(path.post_id))?;

	if !policy::can_edit_post(viewer.user(), &post) {
		return Ok(Render::redirect(detail_url(post.id)));
	}

	let groups = group::query::list_all(&database).await?;

	Ok(Render::Context(model::PostFormContext {
		form: model::PostForm::from(&post),
		groups,
		is_edit: true,
		post: Some(post),
	}))
}

/// Edit post
/// Changes the text and group of a post, then redirects to its page.
/// Anyone but the author is sent to the post's page without changing it.
#[route(tag = tag::POST)]
pub async fn edit_post(
	State(database): State<Database>,
	viewer: Viewer,
	Path(path): Path<model::PostPath>,
	form: Deferred<model::PostForm>,
) -> Result<Render<()>, RouteError> {
	if viewer.user().is_none() {
		return Ok(viewer.login_redirect());
	}

	let mut tx = database.begin().await?;

	let post = query::find_post(&mut *tx, path.post_id)
		.await?
		.ok_or(Error::UnknownPost(path.post_id))?;

	if !policy::can_edit_post(viewer.user(), &post) {
		tracing::debug!(post_id = post.id, "edit by someone other than the author");
		return Ok(Render::redirect(detail_url(post.id)));
	}

	let form = form.validated()?;
	check_group(&mut *tx, form.group_id).await?;

	sqlx::query("UPDATE post SET text = ?, group_id = ? WHERE id = ?")
		.bind(form.text.trim())
		.bind(form.group_id)
		.bind(post.id)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	tracing::info!(post_id = post.id, "post edited");

	Ok(Render::redirect(detail_url(post.id)))
}

pub fn detail_url(post_id: i64) -> String {
	format!("/posts/{post_id}/")
}
