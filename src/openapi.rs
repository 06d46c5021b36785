use aide::{
	openapi::{ApiKeyLocation, SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{error, extract::Json, session};

pub const SECURITY_SCHEME_SESSION: &str = "Session";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const POST: &str = "Post";
	pub const GROUP: &str = "Group";
	pub const ADMIN: &str = "Admin";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Yatube")
		.summary("A small blogging service")
		.description(
			"Users write short posts, optionally filed under a group, and browse them \
			 newest first: all together, per group or per author. Only the author of a \
			 post may edit it.",
		)
		.tag(Tag {
			name: tag::AUTH.into(),
			description: Some("Accounts and sessions".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Post listings, creation and editing".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::GROUP.into(),
			description: Some("Posts filed under a group".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::ADMIN.into(),
			description: Some("Staff-only management of groups and posts".into()),
			..Default::default()
		})
		.security_scheme(
			SECURITY_SCHEME_SESSION,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Cookie,
				name: session::COOKIE_NAME.into(),
				description: Some("A user session cookie".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::ErrorResponse<'static>>, _>(|res| {
			res.example(error::ErrorResponse {
				errors: error::Message::new("error_code")
					.field("optional field")
					.detail("key", "value")
					.into_vec(),
			})
		})
}
