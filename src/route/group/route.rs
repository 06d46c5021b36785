use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query},
	openapi::tag,
	route::post::query::{list_posts, PostFilter},
	Database,
};

use super::{model, query, Error, RouteError};

/// Get group posts
/// Returns the group and a page of the posts filed under it, newest first.
#[route(tag = tag::GROUP)]
pub async fn group_posts(
	State(database): State<Database>,
	Path(path): Path<model::GroupPath>,
	Query(page): Query<model::PageInput>,
) -> Result<Json<model::GroupContext>, RouteError> {
	let group = query::find_by_slug(&database, &path.slug)
		.await?
		.ok_or(Error::UnknownGroup(path.slug))?;

	let page_obj = list_posts(&database, PostFilter::group(group.id), page.number()).await?;

	Ok(Json(model::GroupContext { group, page_obj }))
}
