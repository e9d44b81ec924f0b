use actix_web::{get, post, put, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::error::{AppError, Result};
use crate::models::{ReportCategory, ReportStatus};
use crate::repository::ReportFilter;
use crate::services::{AuthenticatedUser, NewReport};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportPayload {
    #[validate(length(min = 1, max = 160))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub category: ReportCategory,

    #[validate(length(min = 1, max = 200))]
    pub location: String,

    pub photo_url: Option<String>,

    /// Confidence score from the photo validation pipeline, in [0, 100]
    #[validate(range(min = 0.0, max = 100.0))]
    pub validation_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub status: Option<ReportStatus>,
    pub category: Option<ReportCategory>,
    /// Restrict the listing to the caller's own reports
    pub mine: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: ReportStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentPayload {
    #[validate(length(min = 1, max = 500))]
    pub body: String,
}

#[post("/reports")]
pub async fn create_report(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateReportPayload>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let payload = payload.into_inner();
    let (report, new_balance) = state
        .reports
        .submit(
            caller.id,
            NewReport {
                title: payload.title,
                description: payload.description,
                category: payload.category,
                location: payload.location,
                photo_url: payload.photo_url,
                validation_score: payload.validation_score,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "report": report,
        "new_balance": new_balance,
    })))
}

#[get("/reports")]
pub async fn list_reports(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse> {
    let filter = ReportFilter {
        status: query.status,
        category: query.category,
        reporter_id: query.mine.unwrap_or(false).then_some(caller.id),
        limit: query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE),
        offset: query.offset.unwrap_or(0).max(0),
    };

    let reports = state.reports.list(&filter).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "reports": reports,
        "limit": filter.limit,
        "offset": filter.offset,
    })))
}

#[get("/reports/{report_id}")]
pub async fn get_report(
    state: web::Data<AppState>,
    _caller: AuthenticatedUser,
    report_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let report = state.reports.get(report_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[put("/reports/{report_id}/status")]
pub async fn update_report_status(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    report_id: web::Path<Uuid>,
    payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse> {
    let report = state
        .reports
        .transition(report_id.into_inner(), payload.status, caller.role)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

#[post("/reports/{report_id}/escalate")]
pub async fn escalate_report(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    report_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if !caller.role.is_admin() {
        return Err(AppError::Unauthorized(
            "only admins may escalate reports".to_string(),
        ));
    }

    let report = state.reports.escalate(report_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[post("/reports/{report_id}/upvote")]
pub async fn upvote_report(
    state: web::Data<AppState>,
    _caller: AuthenticatedUser,
    report_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let report_id = report_id.into_inner();
    let upvote_count = state.reports.upvote(report_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "report_id": report_id,
        "upvote_count": upvote_count,
    })))
}

#[post("/reports/{report_id}/comments")]
pub async fn add_comment(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    report_id: web::Path<Uuid>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let comment = state
        .reports
        .comment(report_id.into_inner(), caller.id, payload.body.clone())
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

#[get("/reports/{report_id}/comments")]
pub async fn list_comments(
    state: web::Data<AppState>,
    _caller: AuthenticatedUser,
    report_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comments = state.reports.comments(report_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}
