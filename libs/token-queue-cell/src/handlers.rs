use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{Json, Response},
    Extension,
};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::auth::{Actor, ActorRole};
use shared_models::error::AppError;

use crate::models::{
    BookTokenRequest, CreateTokenRequest, SetPriorityRequest, Token, TokenIssued, TokenPriority,
    WalkinTokenRequest,
};
use crate::state::QueueState;

/// Staff token creation: any authenticated staff actor, priority allowed.
pub async fn create_token(
    State(state): State<Arc<QueueState>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateTokenRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    info!(
        "Token creation request for doctor {} from actor {}",
        request.doctor_id, actor.id
    );

    let token = state
        .scheduler
        .create(
            request.doctor_id,
            request.patient_id,
            request.hospital_id,
            request.priority.unwrap_or(TokenPriority::Normal),
        )
        .await?;

    let issued = issued_response(&state, &token).await;
    Ok((StatusCode::CREATED, Json(json!(issued))))
}

/// Patient self-service booking; the caller is the patient and the priority
/// is always normal.
pub async fn book_token(
    State(state): State<Arc<QueueState>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<BookTokenRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if actor.role != ActorRole::Patient {
        return Err(AppError::Permission(
            "Only patients may book tokens".to_string(),
        ));
    }

    let token = state
        .scheduler
        .create(
            request.doctor_id,
            actor.id,
            request.hospital_id,
            TokenPriority::Normal,
        )
        .await?;

    let issued = issued_response(&state, &token).await;
    Ok((StatusCode::CREATED, Json(json!(issued))))
}

/// Walk-in flow: reception creates a placeholder patient record and a token
/// in one step.
pub async fn walkin_token(
    State(state): State<Arc<QueueState>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<WalkinTokenRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if !matches!(actor.role, ActorRole::Receptionist | ActorRole::Admin) {
        return Err(AppError::Permission(
            "Only reception staff may create walk-in tokens".to_string(),
        ));
    }

    let patient = state
        .directory
        .create_walkin_patient(&request.patient_name)
        .await
        .map_err(crate::TokenQueueError::from)?;

    let token = state
        .scheduler
        .create(request.doctor_id, patient.id, None, TokenPriority::Normal)
        .await?;

    let issued = issued_response(&state, &token).await;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token_id": issued.token_id,
            "token_number": issued.token_number,
            "patient_id": patient.id,
            "patient_name": patient.name,
            "estimated_wait_minutes": issued.estimated_wait_minutes,
            "eta": issued.eta
        })),
    ))
}

/// Active queue for a doctor, priority desc then token number asc. Empty
/// list rather than an error when nothing is pending.
pub async fn doctor_queue(
    State(state): State<Arc<QueueState>>,
    Path(doctor_id): Path<Uuid>,
) -> Json<Value> {
    let queue = state.scheduler.queue(doctor_id).await;
    Json(json!({ "doctor_id": doctor_id, "queue": queue }))
}

pub async fn estimate_wait(
    State(state): State<Arc<QueueState>>,
    Path((doctor_id, token_number)): Path<(Uuid, u32)>,
) -> Json<Value> {
    let estimate = state.estimator.estimate(doctor_id, token_number).await;
    Json(json!(estimate))
}

pub async fn call_token(
    State(state): State<Arc<QueueState>>,
    Extension(actor): Extension<Actor>,
    Path(token_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let token = state.scheduler.call(token_id, &actor).await?;
    Ok(Json(json!({
        "detail": "Token called",
        "token_id": token.id,
        "token_number": token.token_number,
        "status": token.status
    })))
}

pub async fn complete_token(
    State(state): State<Arc<QueueState>>,
    Extension(actor): Extension<Actor>,
    Path(token_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let token = state.scheduler.complete(token_id, &actor).await?;
    Ok(Json(json!({
        "detail": "Token completed",
        "token_id": token.id,
        "status": token.status
    })))
}

pub async fn skip_token(
    State(state): State<Arc<QueueState>>,
    Extension(actor): Extension<Actor>,
    Path(token_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let token = state.scheduler.skip(token_id, &actor).await?;
    Ok(Json(json!({
        "detail": "Token skipped",
        "token_id": token.id,
        "status": token.status
    })))
}

pub async fn set_priority(
    State(state): State<Arc<QueueState>>,
    Extension(actor): Extension<Actor>,
    Path(token_id): Path<Uuid>,
    Json(request): Json<SetPriorityRequest>,
) -> Result<Json<Value>, AppError> {
    let token = state
        .scheduler
        .set_priority(token_id, request.priority, &actor)
        .await?;
    Ok(Json(json!({
        "detail": "Token priority updated",
        "token_id": token.id,
        "priority": token.priority
    })))
}

/// Reception check-in verification (QR payload carries the token id).
pub async fn verify_token(
    State(state): State<Arc<QueueState>>,
    Extension(actor): Extension<Actor>,
    Path(token_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !matches!(actor.role, ActorRole::Receptionist | ActorRole::Admin) {
        return Err(AppError::Permission(
            "Only reception staff may verify tokens".to_string(),
        ));
    }

    let verification = state.scheduler.verify(token_id).await?;
    Ok(Json(json!(verification)))
}

/// A patient's current token plus its live estimate, if they hold one.
pub async fn patient_active(
    State(state): State<Arc<QueueState>>,
    Path(patient_id): Path<Uuid>,
) -> Json<Value> {
    match state.store.active_for_patient(patient_id).await {
        Some(token) => {
            let estimate = state
                .estimator
                .estimate(token.doctor_id, token.token_number)
                .await;
            Json(json!({
                "has_token": true,
                "token": token,
                "estimated_wait_minutes": estimate.wait_minutes,
                "eta": estimate.eta
            }))
        }
        None => Json(json!({ "has_token": false })),
    }
}

pub async fn patient_history(
    State(state): State<Arc<QueueState>>,
    Path(patient_id): Path<Uuid>,
) -> Json<Value> {
    let tokens = state.store.history_for_patient(patient_id).await;
    Json(json!({ "patient_id": patient_id, "tokens": tokens }))
}

pub async fn patient_notifications(
    State(state): State<Arc<QueueState>>,
    Path(patient_id): Path<Uuid>,
) -> Json<Value> {
    let notifications = state.dispatcher.for_patient(patient_id).await;
    Json(json!({ "patient_id": patient_id, "notifications": notifications }))
}

/// Push-only WebSocket bound to one doctor's queue channel.
pub async fn queue_ws(
    State(state): State<Arc<QueueState>>,
    Path(doctor_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| stream_queue_events(socket, state, doctor_id))
}

async fn stream_queue_events(socket: WebSocket, state: Arc<QueueState>, doctor_id: Uuid) {
    let mut events = state.broadcaster.subscribe(doctor_id).await;
    let (mut sink, mut stream) = socket.split();

    debug!("Queue subscriber connected for doctor {}", doctor_id);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("Failed to serialize queue event: {}", e);
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(
                        "Queue subscriber for doctor {} lagged, {} events dropped",
                        doctor_id, missed
                    );
                }
                Err(RecvError::Closed) => break,
            },
            message = stream.next() => match message {
                // Push-only channel; inbound frames are ignored.
                Some(Ok(_)) => {}
                // Disconnect drops the receiver and frees the subscription.
                _ => break,
            },
        }
    }

    debug!("Queue subscriber disconnected for doctor {}", doctor_id);
}

async fn issued_response(state: &QueueState, token: &Token) -> TokenIssued {
    let estimate = state
        .estimator
        .estimate(token.doctor_id, token.token_number)
        .await;
    TokenIssued {
        token_id: token.id,
        token_number: token.token_number,
        status: token.status,
        priority: token.priority,
        estimated_wait_minutes: estimate.wait_minutes,
        eta: estimate.eta,
    }
}
