use axum::{extract::State, http::StatusCode};
use macros::route;

use crate::{
	extract::{Json, Path, Query},
	openapi::tag,
	route::{
		group,
		post::query::{self as post_query, PostFilter},
	},
	Database,
};

use super::{model, Error, RouteError, Staff};

fn map_slug_taken(error: sqlx::Error) -> RouteError {
	match error {
		sqlx::Error::Database(ref d) if d.is_unique_violation() => Error::SlugTaken.into(),
		e => RouteError::from(e),
	}
}

/// List groups
/// Returns every group, ordered by title.
#[route(tag = tag::ADMIN)]
pub async fn list_groups(
	State(database): State<Database>,
	_staff: Staff,
) -> Result<Json<Vec<model::Group>>, RouteError> {
	Ok(Json(group::query::list_all(&database).await?))
}

/// Create group
/// Creates a new group. Slugs must be unique.
#[route(tag = tag::ADMIN, response(status = 201, description = "Group created.", shape = "Json<model::Group>"))]
pub async fn create_group(
	State(database): State<Database>,
	staff: Staff,
	Json(form): Json<model::GroupForm>,
) -> Result<(StatusCode, Json<model::Group>), RouteError> {
	let group = sqlx::query_as::<_, model::Group>(
		r#"INSERT INTO "group" (title, slug, description) VALUES (?, ?, ?) RETURNING *"#,
	)
	.bind(&form.title)
	.bind(&form.slug)
	.bind(&form.description)
	.fetch_one(&database)
	.await
	.map_err(map_slug_taken)?;

	tracing::info!(slug = %group.slug, staff = %staff.0.user.username, "group created");

	Ok((StatusCode::CREATED, Json(group)))
}

/// Update group
/// Replaces the title, slug and description of a group.
#[route(tag = tag::ADMIN)]
pub async fn update_group(
	State(database): State<Database>,
	_staff: Staff,
	Path(path): Path<model::GroupPath>,
	Json(form): Json<model::GroupForm>,
) -> Result<Json<model::Group>, RouteError> {
	let group = sqlx::query_as::<_, model::Group>(
		r#"
			UPDATE "group" SET title = ?, slug = ?, description = ?
			WHERE slug = ?
			RETURNING *
		"#,
	)
	.bind(&form.title)
	.bind(&form.slug)
	.bind(&form.description)
	.bind(&path.slug)
	.fetch_optional(&database)
	.await
	.map_err(map_slug_taken)?;

	Ok(Json(group.ok_or(Error::UnknownGroup(path.slug))?))
}

/// Delete group
/// Deletes a group. Groups that posts are still filed under cannot be deleted.
#[route(tag = tag::ADMIN)]
pub async fn delete_group(
	State(database): State<Database>,
	staff: Staff,
	Path(path): Path<model::GroupPath>,
) -> Result<(), RouteError> {
	let mut tx = database.begin().await?;

	let group = group::query::find_by_slug(&mut *tx, &path.slug)
		.await?
		.ok_or_else(|| Error::UnknownGroup(path.slug.clone()))?;

	let posts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post WHERE group_id = ?")
		.bind(group.id)
		.fetch_one(&mut *tx)
		.await?;

	if posts > 0 {
		return Err(Error::GroupInUse {
			slug: group.slug,
			posts,
		}
		.into());
	}

	sqlx::query(r#"DELETE FROM "group" WHERE id = ?"#)
		.bind(group.id)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	tracing::info!(slug = %group.slug, staff = %staff.0.user.username, "group deleted");

	Ok(())
}

/// Search posts
/// Returns a page of posts whose text contains the search string, newest first.
/// The listing can be narrowed to posts published within a time range.
#[route(tag = tag::ADMIN)]
pub async fn list_posts(
	State(database): State<Database>,
	_staff: Staff,
	Query(search): Query<model::SearchInput>,
	Query(page): Query<model::PageInput>,
) -> Result<Json<model::Page<model::Post>>, RouteError> {
	let filter = PostFilter {
		search: search
			.search
			.as_deref()
			.map(str::trim)
			.filter(|search| !search.is_empty())
			.map(str::to_owned),
		since: search.since,
		until: search.until,
		..PostFilter::default()
	};

	Ok(Json(
		post_query::list_posts(&database, filter, page.number()).await?,
	))
}

/// Move post
/// Files a post under another group, or under none.
#[route(tag = tag::ADMIN)]
pub async fn update_post_group(
	State(database): State<Database>,
	_staff: Staff,
	Path(path): Path<model::PostPath>,
	Json(input): Json<model::PostGroupInput>,
) -> Result<Json<model::Post>, RouteError> {
	let mut tx = database.begin().await?;

	if let Some(group_id) = input.group {
		group::query::find_by_id(&mut *tx, group_id)
			.await?
			.ok_or(Error::InvalidGroup(group_id))?;
	}

	let post = sqlx::query_as::<_, model::Post>("UPDATE post SET group_id = ? WHERE id = ? RETURNING *")
		.bind(input.group)
		.bind(path.post_id)
		.fetch_optional(&mut *tx)
		.await?
		.ok_or(Error::UnknownPost(path.post_id))?;

	tx.commit().await?;

	Ok(Json(post))
}

/// Delete post
/// Deletes any post by its id.
#[route(tag = tag::ADMIN)]
pub async fn delete_post(
	State(database): State<Database>,
	staff: Staff,
	Path(path): Path<model::PostPath>,
) -> Result<(), RouteError> {
	let status = sqlx::query("DELETE FROM post WHERE id = ?")
		.bind(path.post_id)
		.execute(&database)
		.await?;

	if status.rows_affected() == 0 {
		return Err(Error::UnknownPost(path.post_id).into());
	}

	tracing::info!(post_id = path.post_id, staff = %staff.0.user.username, "post deleted");

	Ok(())
}
