//! Claims handlers

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use validator::Validate;

use core_kernel::{ClaimId, JobId};
use domain_claims::{ClaimCommand, CostSummary, DashboardSummary, LineReviewAction};

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

fn validated<T: Validate>(request: T) -> Result<T, ApiError> {
    request.validate()?;
    Ok(request)
}

/// Creates a claim from intake data
pub async fn create_claim(
    State(state): State<AppState>,
    Json(request): Json<CreateClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let request = validated(request)?;
    let claim = state.service.open_claim(request.into_input()).await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

/// Lists claims, optionally filtered by status
pub async fn list_claims(
    State(state): State<AppState>,
    Query(query): Query<ListClaimsQuery>,
) -> Result<Json<Vec<ClaimSummaryResponse>>, ApiError> {
    let status = query.status().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let claims = state.service.list_claims(status).await?;
    Ok(Json(claims.iter().map(ClaimSummaryResponse::from).collect()))
}

/// Dashboard counts per status
pub async fn summary(State(state): State<AppState>) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(state.service.summary().await?))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
) -> Result<Json<ClaimResponse>, ApiError> {
    Ok(Json(state.service.get_claim(id).await?.into()))
}

/// Gets a claim by its human-readable number
pub async fn get_claim_by_number(
    State(state): State<AppState>,
    Path(claim_number): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    Ok(Json(state.service.get_by_number(&claim_number).await?.into()))
}

/// Corrects descriptive fields
pub async fn update_claim(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
    Json(request): Json<UpdateClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let (patch, expected_version) = validated(request)?.into_patch();
    let claim = state.service.update_details(id, patch, expected_version).await?;
    Ok(Json(claim.into()))
}

/// Sends the photo upload link
pub async fn send_upload_link(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
    Json(request): Json<NotifyRequest>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let (claim, receipt) = state.service.send_upload_link(id, request.channel).await?;
    Ok(Json(NotificationResponse {
        claim: claim.into(),
        receipt,
    }))
}

/// Reminds the customer to upload photos
pub async fn send_reminder(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
    Json(request): Json<NotifyRequest>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let (claim, receipt) = state.service.send_photo_reminder(id, request.channel).await?;
    Ok(Json(NotificationResponse {
        claim: claim.into(),
        receipt,
    }))
}

/// Uploads one photo; the body is the raw image
pub async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
    Query(query): Query<PhotoUploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let query = validated(query)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| ct.starts_with("image/"));

    let claim = state
        .service
        .upload_photo(id, &query.filename, content_type, body.to_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

/// Takes a photo off a claim before its assessment
pub async fn remove_photo(
    State(state): State<AppState>,
    Path(path): Path<PhotoPath>,
    Query(query): Query<VersionQuery>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state
        .service
        .remove_photo(path.id, path.photo_id, query.expected_version)
        .await?;
    Ok(Json(claim.into()))
}

/// Starts the AI assessment in the background
pub async fn dispatch_assessment(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    let job = state.service.dispatch_assessment(id).await?;
    Ok((StatusCode::ACCEPTED, Json(job.detach().into())))
}

/// Status of an assessment job
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> Result<Json<JobResponse>, ApiError> {
    state
        .service
        .job_status(job_id)
        .await
        .map(|snapshot| Json(snapshot.into()))
        .ok_or_else(|| ApiError::NotFound(format!("job {job_id}")))
}

pub async fn cost_summary(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
) -> Result<Json<CostSummary>, ApiError> {
    Ok(Json(state.service.cost_summary(id).await?))
}

/// Applies an agent action to one damage line
pub async fn review_line(
    State(state): State<AppState>,
    Path(path): Path<LinePath>,
    Json(request): Json<LineReviewRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    if let LineReviewAction::Edit(edit) = &request.action {
        if edit.is_empty() {
            return Err(ApiError::Validation("edit changes nothing".to_string()));
        }
    }
    let claim = state
        .service
        .review_line(path.id, path.line_id, request.action, request.expected_version)
        .await?;
    Ok(Json(claim.into()))
}

pub async fn set_agent_notes(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
    Json(request): Json<AgentNotesRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let command = ClaimCommand::SetAgentNotes {
        notes: request.notes,
    };
    let claim = state
        .service
        .execute(id, command, request.expected_version)
        .await?;
    Ok(Json(claim.into()))
}

/// Sends the reviewed claim to the adjuster
pub async fn submit_review(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let request = validated(request)?;
    let command = ClaimCommand::SubmitReview {
        agent: request.agent,
        adjustment_reason: request.adjustment_reason,
    };
    let claim = state
        .service
        .execute(id, command, request.expected_version)
        .await?;
    Ok(Json(claim.into()))
}

/// Discards every line adjustment
pub async fn reset_review(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
    Query(query): Query<VersionQuery>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.service.reset_review(id, query.expected_version).await?;
    Ok(Json(claim.into()))
}

/// Picks a claim back up after the adjuster asked for a revision
pub async fn resume_review(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
    Json(request): Json<ResumeReviewRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let request = validated(request)?;
    let command = ClaimCommand::ResumeReview {
        agent: request.agent,
    };
    let claim = state
        .service
        .execute(id, command, request.expected_version)
        .await?;
    Ok(Json(claim.into()))
}

/// Records the adjuster's decision
pub async fn decide(
    State(state): State<AppState>,
    Path(id): Path<ClaimId>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let (command, expected_version) = validated(request)?.into_command();
    let claim = state.service.execute(id, command, expected_version).await?;
    Ok(Json(claim.into()))
}
