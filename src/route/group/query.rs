use sqlx::SqliteExecutor;

use super::model::Group;

pub async fn find_by_slug<'c>(
	executor: impl SqliteExecutor<'c>,
	slug: &str,
) -> Result<Option<Group>, sqlx::Error> {
	sqlx::query_as::<_, Group>(r#"SELECT * FROM "group" WHERE slug = ?"#)
		.bind(slug)
		.fetch_optional(executor)
		.await
}

pub async fn find_by_id<'c>(
	executor: impl SqliteExecutor<'c>,
	id: i64,
) -> Result<Option<Group>, sqlx::Error> {
	sqlx::query_as::<_, Group>(r#"SELECT * FROM "group" WHERE id = ?"#)
		.bind(id)
		.fetch_optional(executor)
		.await
}

/// All groups, ordered by title, for choosing a post's group.
pub async fn list_all<'c>(executor: impl SqliteExecutor<'c>) -> Result<Vec<Group>, sqlx::Error> {
	sqlx::query_as::<_, Group>(r#"SELECT * FROM "group" ORDER BY title, id"#)
		.fetch_all(executor)
		.await
}
