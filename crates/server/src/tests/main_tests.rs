use super::*;
use axum::{body, body::Body, http::Request};
use shared::domain::Position;
use tower::ServiceExt;

fn test_app() -> Router {
    build_router(AppState {
        cities: Arc::new(CityRepository::in_memory()),
    })
}

fn city_payload(name: &str) -> serde_json::Value {
    serde_json::json!({
        "cityName": name,
        "country": "Portugal",
        "countryCode": "PT",
        "emoji": "🇵🇹",
        "date": "2024-06-01T12:00:00Z",
        "notes": "",
        "position": { "lat": 38.7, "lng": -9.1 }
    })
}

async fn post_city(app: &Router, name: &str) -> City {
    let request = Request::post("/cities")
        .header("content-type", "application/json")
        .body(Body::from(city_payload(name).to_string()))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app();
    let request = Request::get("/healthz").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(bytes.as_ref(), b"ok");
}

#[tokio::test]
async fn create_list_get_delete_lifecycle() {
    let app = test_app();

    let lisbon = post_city(&app, "Lisbon").await;
    let porto = post_city(&app, "Porto").await;
    assert_ne!(lisbon.id, porto.id);
    assert_eq!(lisbon.city_name, "Lisbon");
    assert_eq!(lisbon.position, Position { lat: 38.7, lng: -9.1 });

    let request = Request::get("/cities").body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let cities: Vec<City> = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(cities.len(), 2);
    assert_eq!(cities[0].id, lisbon.id);

    let request = Request::get(format!("/cities/{}", porto.id.0))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let fetched: City = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(fetched, porto);

    let request = Request::delete(format!("/cities/{}", lisbon.id.0))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = Request::get(format!("/cities/{}", lisbon.id.0))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_unknown_id_is_a_not_found_error() {
    let app = test_app();
    post_city(&app, "Lisbon").await;

    let request = Request::delete("/cities/9999")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let error: ApiError = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(error.code, ErrorCode::NotFound);

    let request = Request::get("/cities").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let cities: Vec<City> = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(cities.len(), 1);
}

#[tokio::test]
async fn rejects_a_city_without_a_name() {
    let app = test_app();
    let request = Request::post("/cities")
        .header("content-type", "application/json")
        .body(Body::from(city_payload("").to_string()))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let error: ApiError = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(error.code, ErrorCode::Validation);
}
