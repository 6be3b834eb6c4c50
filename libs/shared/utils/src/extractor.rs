use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use shared_models::auth::{Actor, ActorRole};
use shared_models::error::AppError;

// Middleware resolving the caller into an Actor. Identity is established by
// the upstream gateway and forwarded as headers; this service trusts them.
pub async fn actor_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let actor_id = header_value(&request, "x-actor-id")?
        .parse::<Uuid>()
        .map_err(|_| AppError::Auth("Invalid x-actor-id header".to_string()))?;

    let role_value = header_value(&request, "x-actor-role")?;
    let role = ActorRole::parse(&role_value)
        .ok_or_else(|| AppError::Auth(format!("Unknown actor role: {}", role_value)))?;

    let doctor_id = match request.headers().get("x-actor-doctor-id") {
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| AppError::Auth("Invalid x-actor-doctor-id header".to_string()))?;
            Some(
                raw.parse::<Uuid>()
                    .map_err(|_| AppError::Auth("Invalid x-actor-doctor-id header".to_string()))?,
            )
        }
        None => None,
    };

    let actor = Actor {
        id: actor_id,
        role,
        doctor_id,
    };

    // Add actor to request extensions
    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

fn header_value(request: &Request<Body>, name: &str) -> Result<String, AppError> {
    request
        .headers()
        .get(name)
        .ok_or_else(|| AppError::Auth(format!("Missing {} header", name)))?
        .to_str()
        .map(|v| v.to_string())
        .map_err(|_| AppError::Auth(format!("Invalid {} header", name)))
}
