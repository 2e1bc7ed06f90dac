use axum::{
    http::{HeaderMap, Uri},
    response::Json,
};
use problem::ProblemResponse;
use serde_json::{json, Value};

use crate::request_id;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn not_found(uri: Uri, headers: HeaderMap) -> ProblemResponse {
    let ProblemResponse(mut problem) = problem::not_found(format!("No route for {}", uri.path()));
    problem = problem.with_instance(uri.path());
    if let Some(rid) = headers
        .get(request_id::header())
        .and_then(|v| v.to_str().ok())
    {
        problem = problem.with_request_id(rid);
    }
    ProblemResponse(problem)
}
