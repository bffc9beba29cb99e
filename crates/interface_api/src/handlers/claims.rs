//! Claims handlers

use std::convert::Infallible;
use std::str::FromStr;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;
use tracing::info;
use validator::Validate;

use core_kernel::{ClaimId, OwnerId};
use domain_claims::{ClaimQuery, ClaimRecord, ClaimStatus, SubmissionOutcome};

use crate::auth::{has_role, permissions, require, AuthClaims};
use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Ceiling and reimbursement for the current form input
pub async fn evaluate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthClaims>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    require(&user, permissions::CLAIM_WRITE)?;

    let claim_type = request.claim_type.as_deref().and_then(|t| t.parse().ok());
    let evaluation = state
        .submissions
        .evaluator()
        .evaluate(claim_type, request.claim_amount);

    Ok(Json(evaluation.into()))
}

/// Submits a claim
pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(user): Extension<AuthClaims>,
    payload: Result<Json<SubmitClaimRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    require(&user, permissions::CLAIM_WRITE)?;
    let Json(request) = payload?;
    request
        .validate()
        .map_err(|e| ApiError::field("file", "invalid_document", e.to_string()))?;

    let owner = user.owner_id();
    let _guard = state
        .in_flight
        .acquire(&owner)
        .ok_or_else(|| ApiError::Conflict("A submission is already in progress".to_string()))?;

    let mut session = state.submissions.new_session(owner, user.name.clone());
    let draft = session.draft_mut();
    draft.set_claim_type(request.claim_type());
    match &request.claim_amount {
        Some(AmountInput::Number(amount)) => draft.set_claim_amount(Some(*amount)),
        Some(AmountInput::Text(text)) => draft
            .set_amount_input(text)
            .map_err(|_| ApiError::field("claimAmount", "invalid_amount", "Claim amount must be a number."))?,
        None => draft.set_claim_amount(None),
    }
    if let Some(document) = request.document()? {
        draft.set_document(document);
    }

    match state.submissions.submit(&mut session).await? {
        SubmissionOutcome::Accepted(record) => Ok((StatusCode::CREATED, Json(ClaimResponse::from(&record)))),
        SubmissionOutcome::Invalid(errors) => Err(ApiError::validation(errors)),
        SubmissionOutcome::Rejected => Err(ApiError::DocumentRejected),
        SubmissionOutcome::Failed(failure) => Err(failure.into()),
    }
}

/// Lists claims, newest first
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(user): Extension<AuthClaims>,
    Query(params): Query<ListClaimsQuery>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let query = visible_claims(&user, params.all)?;
    let query = match params.limit {
        Some(limit) => query.limit(limit),
        None => query,
    };

    let claims = state.reviews.list(query).await?;
    Ok(Json(claims.iter().map(ClaimResponse::from).collect()))
}

/// Streams the ordered claim list as server-sent events
///
/// The current list is sent straight away, then again after every change.
pub async fn stream_claims(
    State(state): State<AppState>,
    Extension(user): Extension<AuthClaims>,
    Query(params): Query<ListClaimsQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let query = visible_claims(&user, params.all)?;
    info!(user = %user.sub, all = params.all, "claim stream opened");

    let stream = WatchStream::new(state.feed.subscribe()).map(move |claims| {
        let visible: Vec<ClaimResponse> = claims
            .iter()
            .filter(|c| query.matches(c))
            .map(ClaimResponse::from)
            .collect();
        let event = Event::default()
            .event("claims")
            .json_data(&visible)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));
        Ok(event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    Extension(user): Extension<AuthClaims>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    require(&user, permissions::CLAIM_READ)?;
    let id = parse_id(&id)?;

    let record = state.reviews.get(id).await?;
    ensure_visible(&user, &record, id)?;

    Ok(Json(ClaimResponse::from(&record)))
}

/// Records a reviewer decision
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthClaims>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    require(&user, permissions::CLAIM_REVIEW)?;
    let id = parse_id(&id)?;
    let status = ClaimStatus::from_str(&request.status)?;

    let record = state.reviews.decide(id, status, &user.sub).await?;
    Ok(Json(ClaimResponse::from(&record)))
}

fn parse_id(raw: &str) -> Result<ClaimId, ApiError> {
    ClaimId::from_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid claim id '{raw}'")))
}

// Users see their own claims; reviewers may ask for everyone's
fn visible_claims(user: &AuthClaims, all: bool) -> Result<ClaimQuery, ApiError> {
    require(user, permissions::CLAIM_READ)?;
    if all {
        require(user, permissions::CLAIM_REVIEW)?;
        Ok(ClaimQuery::all())
    } else {
        Ok(ClaimQuery::by_owner(OwnerId::new(user.sub.clone())))
    }
}

fn ensure_visible(user: &AuthClaims, record: &ClaimRecord, id: ClaimId) -> Result<(), ApiError> {
    if record.owner_id.as_str() == user.sub || has_role(user, permissions::CLAIM_REVIEW) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("Claim {id}")))
    }
}
