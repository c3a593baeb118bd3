use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{AppError, Pagination};
use crate::error::RegisterError;
use crate::models::{
    require_scale, NewRisk, Risk, RiskFilter, RiskLevel, RiskPatch, RiskStatus,
    RiskWithRecommendations,
};
use crate::services::recommendations::{self, RecommendationPreview};
use crate::services::AppState;

/// Query string for `GET /risks`. Filter fields mirror `RiskFilter`.
#[derive(Debug, Default, Deserialize)]
pub struct ListRisksQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category_id: Option<i64>,
    pub risk_level: Option<RiskLevel>,
    pub status: Option<RiskStatus>,
    pub probability_min: Option<i32>,
    pub probability_max: Option<i32>,
    pub impact_min: Option<i32>,
    pub impact_max: Option<i32>,
    pub owner: Option<String>,
}

impl ListRisksQuery {
    fn split(self) -> (Pagination, RiskFilter) {
        let page = Pagination {
            skip: self.skip,
            limit: self.limit,
        };
        let filter = RiskFilter {
            category_id: self.category_id,
            risk_level: self.risk_level,
            status: self.status,
            probability_min: self.probability_min,
            probability_max: self.probability_max,
            impact_min: self.impact_min,
            impact_max: self.impact_max,
            owner: self.owner.filter(|o| !o.is_empty()),
        };
        (page, filter)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRecommendationsRequest {
    #[serde(default)]
    pub custom_recommendations: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub probability: i32,
    pub impact: i32,
}

/// Fields posted by the browser form. Empty optional inputs arrive as "".
#[derive(Debug, Deserialize)]
pub struct RiskForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub probability: i32,
    pub impact: i32,
    pub owner: String,
    #[serde(default)]
    pub mitigation_plan: Option<String>,
    pub category_id: i64,
}

impl From<RiskForm> for NewRisk {
    fn from(form: RiskForm) -> Self {
        NewRisk {
            title: form.title,
            description: form.description,
            probability: form.probability,
            impact: form.impact,
            owner: form.owner,
            mitigation_plan: form.mitigation_plan.filter(|plan| !plan.trim().is_empty()),
            category_id: form.category_id,
        }
    }
}

pub async fn create_risk(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewRisk>,
) -> Result<(StatusCode, Json<Risk>), AppError> {
    new.validate()?;
    let risk = state.risks.create(new).await?;
    Ok((StatusCode::CREATED, Json(risk)))
}

pub async fn create_risk_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RiskForm>,
) -> Result<Redirect, AppError> {
    let new = NewRisk::from(form);
    new.validate()?;
    let risk = state.risks.create(new).await?;
    Ok(Redirect::to(&format!("/static/index.html?created={}", risk.id)))
}

pub async fn list_risks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListRisksQuery>,
) -> Result<Json<Vec<Risk>>, AppError> {
    let (page, filter) = query.split();
    let (skip, limit) = page.resolve(state.config.default_page_size);

    let risks = state.risks.list(&filter, skip, limit).await?;
    Ok(Json(risks))
}

pub async fn get_risk(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Risk>, AppError> {
    Ok(Json(state.risks.get(id).await?))
}

pub async fn update_risk(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<RiskPatch>,
) -> Result<Json<Risk>, AppError> {
    patch.validate()?;
    Ok(Json(state.risks.update(id, patch).await?))
}

pub async fn delete_risk(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    match state.risks.delete(id).await? {
        Some(_) => Ok(Json(json!({ "message": "Risk deleted successfully" }))),
        None => Err(RegisterError::risk_not_found(id).into()),
    }
}

pub async fn get_risk_recommendations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RiskWithRecommendations>, AppError> {
    Ok(Json(state.risks.detailed(id).await?))
}

/// An empty body regenerates the text from the stored scoring. Any other
/// body must be a valid request document.
pub async fn refresh_recommendations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<Risk>, AppError> {
    let request = parse_refresh_body(&body)?;
    let risk = state
        .risks
        .refresh_recommendations(id, request.custom_recommendations)
        .await?;
    Ok(Json(risk))
}

fn parse_refresh_body(body: &[u8]) -> Result<RefreshRecommendationsRequest, RegisterError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RefreshRecommendationsRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| RegisterError::Validation(format!("invalid request body: {e}")))
}

pub async fn preview_recommendations(
    Json(req): Json<PreviewRequest>,
) -> Result<Json<RecommendationPreview>, AppError> {
    require_scale("probability", req.probability)?;
    require_scale("impact", req.impact)?;

    Ok(Json(recommendations::preview(req.probability, req.impact)))
}
