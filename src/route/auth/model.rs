use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Usernames may contain letters, digits and `@ . + - _`.
fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username
		.chars()
		.any(|c| !c.is_alphanumeric() && !"@.+-_".contains(c))
	{
		let mut error = ValidationError::new("invalid_username");
		error.message = Some("username may only contain letters, digits and @.+-_".into());

		return Err(error);
	}

	Ok(())
}

/// A single user.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The username that is displayed to the public.
	pub username: String,
	/// The hashed password.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// Whether the user may use the administrative API.
	pub is_staff: bool,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Session {
	/// The session id.
	#[serde(rename = "session_id")]
	pub id: Uuid,
	/// The user that owns the session.
	#[serde(skip)]
	#[allow(dead_code)]
	pub user_id: Uuid,
	/// The creation time of the session.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(length(min = 1, max = 150))]
	pub username: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SignupInput {
	/// The username that is displayed to the public.
	#[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
	pub username: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

/// Where to send the user once they have logged in.
#[derive(Debug, Default, Deserialize, Serialize, Validate, JsonSchema)]
pub struct LoginQuery {
	pub next: Option<String>,
}

/// The context of the login page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct LoginContext {
	/// The local path the user asked for before being sent to log in.
	pub next: Option<String>,
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::SignupInput;

	#[test]
	fn test_signup_username_rules() {
		let input = |username: &str| SignupInput {
			username: username.into(),
			password: "hunter2hunter".into(),
		};

		assert!(input("testuser").validate().is_ok());
		assert!(input("test.user+blog@home_1").validate().is_ok());
		assert!(input("test user").validate().is_err());
		assert!(input("").validate().is_err());
	}
}
