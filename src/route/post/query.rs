use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};
use uuid::Uuid;

use crate::{
	route::model::{Page, Paginate},
	Database,
};

use super::model::Post;

/// Which posts a listing contains. Every condition that is set must hold.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
	pub group: Option<i64>,
	pub author: Option<Uuid>,
	/// Posts whose text contains this, ignoring ASCII case.
	pub search: Option<String>,
	/// Posts published at or after this time.
	pub since: Option<DateTime<Utc>>,
	/// Posts published before this time.
	pub until: Option<DateTime<Utc>>,
}

impl PostFilter {
	pub fn all() -> Self {
		Self::default()
	}

	pub fn group(group_id: i64) -> Self {
		Self {
			group: Some(group_id),
			..Self::default()
		}
	}

	pub fn author(author_id: Uuid) -> Self {
		Self {
			author: Some(author_id),
			..Self::default()
		}
	}
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &PostFilter) {
	builder.push(" WHERE 1=1");

	if let Some(group_id) = filter.group {
		builder.push(" AND group_id = ").push_bind(group_id);
	}

	if let Some(author_id) = filter.author {
		builder.push(" AND author_id = ").push_bind(author_id);
	}

	if let Some(ref search) = filter.search {
		builder
			.push(" AND instr(lower(text), lower(")
			.push_bind(search.clone())
			.push(")) > 0");
	}

	// pub_date is stored in the same format, so comparing the text orders by time
	if let Some(since) = filter.since {
		builder
			.push(" AND pub_date >= strftime('%Y-%m-%d %H:%M:%f', ")
			.push_bind(since)
			.push(")");
	}

	if let Some(until) = filter.until {
		builder
			.push(" AND pub_date < strftime('%Y-%m-%d %H:%M:%f', ")
			.push_bind(until)
			.push(")");
	}
}

/// Returns the requested page of the posts matching `filter`, newest first.
///
/// Posts created at the same instant are ordered by id, so later inserts
/// come first. The page number is clamped to the last page.
pub async fn list_posts(
	database: &Database,
	filter: PostFilter,
	requested: i64,
) -> Result<Page<Post>, sqlx::Error> {
	let mut count = QueryBuilder::new("SELECT COUNT(*) FROM post");
	push_filter(&mut count, &filter);

	let count = count
		.build_query_scalar::<i64>()
		.fetch_one(database)
		.await?;

	let paginate = Paginate::new(count, requested);

	let mut select = QueryBuilder::new("SELECT * FROM post");
	push_filter(&mut select, &filter);

	select
		.push(" ORDER BY pub_date DESC, id DESC LIMIT ")
		.push_bind(paginate.limit())
		.push(" OFFSET ")
		.push_bind(paginate.offset());

	let items = select
		.build_query_as::<Post>()
		.fetch_all(database)
		.await?;

	tracing::debug!(?filter, count, page = paginate.number, "listed posts");

	Ok(paginate.page(items))
}

pub async fn find_post<'c>(
	executor: impl SqliteExecutor<'c>,
	post_id: i64,
) -> Result<Option<Post>, sqlx::Error> {
	sqlx::query_as::<_, Post>("SELECT * FROM post WHERE id = ?")
		.bind(post_id)
		.fetch_optional(executor)
		.await
}

/// The total number of posts written by a user.
pub async fn count_by_author<'c>(
	executor: impl SqliteExecutor<'c>,
	author_id: Uuid,
) -> Result<i64, sqlx::Error> {
	sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post WHERE author_id = ?")
		.bind(author_id)
		.fetch_one(executor)
		.await
}
