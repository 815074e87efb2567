use axum::{http::StatusCode, response::Html, Json};
use serde::Serialize;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub const FEATURES: [&str; 4] = [
    "Mood Tracking",
    "Personalized Recommendations",
    "Emergency Detection",
    "Dashboard",
];

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub features: Vec<String>,
    pub version: String,
}

pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            message: "IAmHere support service is running".to_string(),
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

pub async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}
