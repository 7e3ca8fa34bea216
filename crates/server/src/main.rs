use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use shared::{
    domain::{City, CityId, NewCity},
    error::{ApiError, ErrorCode},
};
use tracing::info;

mod config;
mod repository;

use config::{load_settings, prepare_data_file};
use repository::CityRepository;

#[derive(Clone)]
struct AppState {
    cities: Arc<CityRepository>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    prepare_data_file(&settings.data_file)?;
    let cities = CityRepository::open(Some(PathBuf::from(&settings.data_file)))?;

    let state = AppState {
        cities: Arc::new(cities),
    };
    let app = build_router(state);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, data_file = %settings.data_file, "city persistence service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/cities", get(http_list_cities).post(http_create_city))
        .route(
            "/cities/:id",
            get(http_get_city).delete(http_delete_city),
        )
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_cities(State(state): State<AppState>) -> Json<Vec<City>> {
    Json(state.cities.list().await)
}

async fn http_get_city(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match state.cities.get(CityId(id)).await {
        Some(city) => Json(city).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            ApiError::new(ErrorCode::NotFound, format!("no city with id {id}")),
        ),
    }
}

async fn http_create_city(
    State(state): State<AppState>,
    Json(payload): Json<NewCity>,
) -> axum::response::Response {
    if payload.city_name.is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::new(ErrorCode::Validation, "cityName must not be empty"),
        );
    }

    match state.cities.insert(payload).await {
        Ok(city) => (StatusCode::CREATED, Json(city)).into_response(),
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new(ErrorCode::Internal, err.to_string()),
        ),
    }
}

async fn http_delete_city(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> axum::response::Response {
    match state.cities.remove(CityId(id)).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            ApiError::new(ErrorCode::NotFound, format!("no city with id {id}")),
        ),
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new(ErrorCode::Internal, err.to_string()),
        ),
    }
}

fn error_response(status: StatusCode, error: ApiError) -> axum::response::Response {
    (status, Json(error)).into_response()
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
