//! HTTP adapter translating wire requests into scheduler and coordinator calls.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::consensus::{Label, SubmitOutcome, Submissions};
use crate::error::LabelError;
use crate::scheduler::{Job, JobId, Scheduler};

#[derive(Clone)]
pub struct ApiState {
    pub scheduler: Arc<Scheduler>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJobRequest {
    #[serde(rename = "requestID")]
    pub request_id: JobId,
    pub dataset_source: String,
    pub model_source: String,
    pub request_owner: String,
    pub bid: u64,
    pub num_items: usize,
}

#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchResponse {
    #[serde(rename = "requestID")]
    request_id: JobId,
    dataset_url: String,
    model_url: String,
    index_tuple: (usize, usize),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelsRequest {
    #[serde(rename = "requestID")]
    pub request_id: JobId,
    pub user_address: String,
    pub labels: Vec<Label>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum LabelsResponse {
    Pending {
        submitted: usize,
        quorum: usize,
    },
    Finalized {
        #[serde(rename = "requestID")]
        request_id: JobId,
        labels: Vec<Label>,
        participants: Vec<String>,
    },
}

#[derive(Serialize)]
struct ActiveJobResponse {
    id: JobId,
    owner: String,
    bid: u64,
    num_items: usize,
    status: String,
    registered: usize,
    submitted: usize,
    quorum: usize,
}

#[derive(Serialize)]
struct StatusResponse {
    active: Option<ActiveJobResponse>,
    backlog_len: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// HTTP status for a rejected core operation
pub fn error_status(err: &LabelError) -> StatusCode {
    match err {
        LabelError::DuplicateJob(_)
        | LabelError::WorkerAlreadyRegistered(_)
        | LabelError::JobMismatch { .. }
        | LabelError::DuplicateSubmission(_)
        | LabelError::JobClosed(_) => StatusCode::CONFLICT,
        LabelError::BacklogFull(_) => StatusCode::SERVICE_UNAVAILABLE,
        LabelError::LabelCountMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LabelError::UnknownWorker(_) => StatusCode::FORBIDDEN,
    }
}

impl IntoResponse for LabelError {
    fn into_response(self) -> Response {
        (
            error_status(&self),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Extractor failures (malformed JSON, missing query fields) use the same
/// `{"error": ...}` body as core rejections.
fn rejection_response(status: StatusCode, body_text: String) -> Response {
    (status, Json(ErrorResponse { error: body_text })).into_response()
}

/// Normalize a worker address the same way on every route.
fn worker_identity(raw: &str) -> std::result::Result<&str, Response> {
    let identity = raw.trim();
    if identity.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Missing worker address",
        ));
    }
    Ok(identity)
}

pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/newRequest", post(new_request_handler))
        .route("/batch", get(batch_handler))
        .route("/labels", put(labels_handler))
        .route("/api/status", get(status_handler))
        .route("/api/labels", get(snapshot_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn run_api(
    addr: SocketAddr,
    state: ApiState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Starting HTTP server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "API is working" }))
}

async fn new_request_handler(
    State(state): State<ApiState>,
    payload: Result<Json<NewJobRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let job = Job::new(
        req.request_id,
        req.dataset_source,
        req.model_source,
        req.num_items,
        req.request_owner,
        req.bid,
    );
    match state.scheduler.enqueue(job).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Request received" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn batch_handler(
    State(state): State<ApiState>,
    query: Result<Query<BatchQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let address = match worker_identity(&query.address) {
        Ok(address) => address,
        Err(response) => return response,
    };

    let Some(active) = state.scheduler.active_job().await else {
        return error_response(StatusCode::NOT_FOUND, "No active job");
    };

    match active.register_worker(address).await {
        Ok(batch) => Json(BatchResponse {
            request_id: batch.job_id,
            dataset_url: batch.dataset_source,
            model_url: batch.model_source,
            index_tuple: batch.index_range,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn labels_handler(
    State(state): State<ApiState>,
    payload: Result<Json<LabelsRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let identity = match worker_identity(&req.user_address) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let Some(active) = state.scheduler.active_job().await else {
        return error_response(StatusCode::NOT_FOUND, "No active job");
    };

    match active
        .submit_labels(req.request_id, identity, req.labels)
        .await
    {
        Ok(SubmitOutcome::Pending { submitted, quorum }) => (
            StatusCode::ACCEPTED,
            Json(LabelsResponse::Pending { submitted, quorum }),
        )
            .into_response(),
        Ok(SubmitOutcome::Finalized(result)) => {
            state.scheduler.retire(result.job_id).await;
            (
                StatusCode::OK,
                Json(LabelsResponse::Finalized {
                    request_id: result.job_id,
                    labels: result.labels,
                    participants: result.participants,
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn status_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let (current, backlog_len) = state.scheduler.overview().await;
    let active = match current {
        Some(coord) => {
            let job = coord.job();
            Some(ActiveJobResponse {
                id: job.id,
                owner: job.owner.clone(),
                bid: job.bid,
                num_items: job.num_items,
                status: coord.status().await.to_string(),
                registered: coord.worker_count().await,
                submitted: coord.submitted_count().await,
                quorum: coord.quorum(),
            })
        }
        None => None,
    };

    Json(StatusResponse {
        active,
        backlog_len,
    })
}

async fn snapshot_handler(State(state): State<ApiState>) -> Response {
    match state.scheduler.current().await {
        Some(coord) => {
            let labels: Submissions = coord.snapshot_labels().await;
            Json(labels).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "No active job"),
    }
}
