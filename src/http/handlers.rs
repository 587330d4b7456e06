use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::response;
use crate::http::server::AppState;
use crate::routing::AddDomainRequest;

pub const DOMAIN_ADDED: &str = "Domain added successfully!";
pub const USER_INVITED: &str = "User invited successfully!";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub version: String,
    pub status: String,
    pub reload_strategy: String,
}

pub async fn add_domain(
    State(state): State<AppState>,
    payload: Result<Json<AddDomainRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject_body(rejection),
    };

    match state.routing.add_domain(&request).await {
        Ok(_) => response::message(StatusCode::OK, DOMAIN_ADDED),
        Err(e) => response::error(StatusCode::INTERNAL_SERVER_ERROR, e.public_detail()),
    }
}

pub async fn invite(
    State(state): State<AppState>,
    payload: Result<Json<InviteRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject_body(rejection),
    };

    match state.invites.submit(&request.email).await {
        Ok(()) => response::message(StatusCode::OK, USER_INVITED),
        Err(e) => response::error(StatusCode::INTERNAL_SERVER_ERROR, e.public_detail()),
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        reload_strategy: state.routing.reload_strategy().to_string(),
    })
}

fn reject_body(rejection: JsonRejection) -> Response {
    tracing::warn!(error = %rejection, "Rejected request body");
    response::error(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
}
