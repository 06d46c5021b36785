#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod openapi;
mod policy;
mod route;
mod session;

use std::{str::FromStr, sync::Arc};

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{Extension, Router};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub type Database = sqlx::SqlitePool;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as the database connection pool and the hash configuration.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
}

/// Builds the full application: every route, the API docs, the 404 fallback and
/// the request tracing, request id and compression middleware.
pub fn app(state: State) -> Router {
	let mut api = OpenApi::default();

	let router = ApiRouter::new()
		.merge(route::routes())
		.nest_api_service("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs);

	router
		.fallback(error::fallback)
		.layer(Extension(Arc::new(api)))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(
					TraceLayer::new_for_http()
						.make_span_with(DefaultMakeSpan::new().level(Level::INFO))
						.on_response(DefaultOnResponse::new().level(Level::INFO)),
				)
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	dotenvy::dotenv().ok();

	let config = config::Config::from_env()?;

	tracing_subscriber::registry()
		.with(config.log_level)
		.with(tracing_subscriber::fmt::layer().with_ansi(true))
		.init();

	let options = SqliteConnectOptions::from_str(&config.database_url)?
		.create_if_missing(true)
		.foreign_keys(true);

	let database = SqlitePoolOptions::new().connect_with(options).await?;

	sqlx::migrate!().run(&database).await?;

	let state = State {
		database,
		hasher: Argon2::default(),
	};

	if let Some(admin) = &config.admin {
		route::auth::route::ensure_staff_user(
			&state.database,
			&state.hasher,
			&admin.username,
			&admin.password,
		)
		.await
		.map_err(|e| format!("failed to create staff account: {e:?}"))?;

		tracing::info!(username = %admin.username, "staff account ready");
	}

	let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;

	tracing::info!("listening on {}:{}", config.host, config.port);

	axum::serve(listener, app(state)).await?;

	Ok(())
}
