//! Profile job API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use voiceprint_core::{ConsolidatedOutput, Job, JobProgress, JobStatus, ProfileRequest};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a profile job
#[derive(Debug, Deserialize)]
pub struct CreateProfileBody {
    /// Name of the subject to profile
    pub target_name: String,
    /// Optional per-source hints (keys: newsletter, twitter, linkedin, blog,
    /// youtube, substack); hints override discovery
    #[serde(default)]
    pub hints: HashMap<String, String>,
}

/// Query parameters for listing profile jobs
#[derive(Debug, Deserialize)]
pub struct ListProfilesParams {
    /// Filter by job status
    pub status: Option<JobStatus>,
}

/// Response for profile job operations
#[derive(Debug, Serialize)]
pub struct ProfileJobResponse {
    pub id: String,
    pub status: JobStatus,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<JobProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConsolidatedOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Job> for ProfileJobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            status: job.status,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
            progress: job.progress,
            result: job.result,
            error: job.error,
        }
    }
}

/// Response for listing profile jobs
#[derive(Debug, Serialize)]
pub struct ListProfilesResponse {
    pub jobs: Vec<ProfileJobResponse>,
    pub total: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ProfileErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a profile job and start its pipeline run
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProfileBody>,
) -> Result<(StatusCode, Json<ProfileJobResponse>), impl IntoResponse> {
    let target_name = body.target_name.trim().to_string();
    if target_name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ProfileErrorResponse {
                error: "target_name cannot be empty".to_string(),
            }),
        ));
    }

    let job_id = state.store().create_job().await;
    state.executor().spawn(
        job_id.clone(),
        ProfileRequest {
            target_name,
            hints: body.hints,
        },
    );

    match state.store().get_job(&job_id).await {
        Some(job) => Ok((StatusCode::CREATED, Json(ProfileJobResponse::from(job)))),
        None => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ProfileErrorResponse {
                error: format!("Job vanished after creation: {}", job_id),
            }),
        )),
    }
}

/// Get a profile job by ID
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProfileJobResponse>, impl IntoResponse> {
    match state.store().get_job(&id).await {
        Some(job) => Ok(Json(ProfileJobResponse::from(job))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ProfileErrorResponse {
                error: format!("Job not found: {}", id),
            }),
        )),
    }
}

/// List profile jobs, newest first
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListProfilesParams>,
) -> Json<ListProfilesResponse> {
    let mut jobs = state.store().list_jobs().await;
    if let Some(status) = params.status {
        jobs.retain(|job| job.status == status);
    }

    let total = jobs.len();
    Json(ListProfilesResponse {
        jobs: jobs.into_iter().map(ProfileJobResponse::from).collect(),
        total,
    })
}

/// Cancel a profile job (DELETE endpoint)
pub async fn cancel_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProfileJobResponse>, impl IntoResponse> {
    if state.store().cancel_job(&id).await {
        // Just canceled it; the job must still be present.
        return match state.store().get_job(&id).await {
            Some(job) => Ok(Json(ProfileJobResponse::from(job))),
            None => Err((
                StatusCode::NOT_FOUND,
                Json(ProfileErrorResponse {
                    error: format!("Job not found: {}", id),
                }),
            )),
        };
    }

    match state.store().get_job(&id).await {
        Some(job) => Err((
            StatusCode::CONFLICT,
            Json(ProfileErrorResponse {
                error: format!(
                    "Cannot cancel job {}: current status is {}",
                    id,
                    job.status.as_str()
                ),
            }),
        )),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ProfileErrorResponse {
                error: format!("Job not found: {}", id),
            }),
        )),
    }
}
