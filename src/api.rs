use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::ingest::types::PostingRecord;
use crate::ingest::{CrawlReport, Crawler};
use crate::model::{ClusterId, ModelError, ModelInfo};
use crate::pipeline::{
    cluster_summary, match_cluster, project, ClassifiedPosting, MatchedJob, PipelineContext,
};

/// Loaded models plus the crawler. Holds no per-user state.
#[derive(Clone)]
pub struct AppState {
    pub ctx: PipelineContext,
    pub crawler: Arc<Crawler>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/model", get(model_info))
        .route("/crawl", post(crawl))
        .route("/classify", post(classify))
        .route("/match", post(match_postings))
        .route("/run", post(run))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Model(ModelError),
    Internal(anyhow::Error),
}

impl From<ModelError> for ApiError {
    fn from(e: ModelError) -> Self {
        ApiError::Model(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Model(e) => {
                error!(error = %e, "model inference failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::Internal(e) => {
                error!(error = ?e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CrawlReq {
    #[serde(default)]
    pub keyword: String,
    #[serde(default = "one")]
    pub pages: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct MatchReq {
    pub postings: Vec<ClassifiedPosting>,
    pub cluster: ClusterId,
}

#[derive(Debug, Serialize)]
pub struct MatchResp {
    pub cluster: ClusterId,
    pub count: usize,
    pub jobs: Vec<MatchedJob>,
}

#[derive(Debug, Serialize)]
pub struct RunResp {
    pub postings: Vec<ClassifiedPosting>,
    pub clusters: Vec<ClusterId>,
    pub n_clusters: usize,
    pub failed_pages: Vec<u32>,
}

fn check_pages(state: &AppState, pages: u32) -> Result<(), ApiError> {
    let max = state.crawler.site().max_pages;
    if !(1..=max).contains(&pages) {
        return Err(ApiError::BadRequest(format!(
            "pages must be between 1 and {max}, got {pages}"
        )));
    }
    Ok(())
}

async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.ctx.info())
}

async fn crawl(
    State(state): State<AppState>,
    Json(req): Json<CrawlReq>,
) -> Result<Json<CrawlReport>, ApiError> {
    check_pages(&state, req.pages)?;
    let report = state
        .crawler
        .crawl_report(&req.keyword, req.pages)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(report))
}

async fn classify(
    State(state): State<AppState>,
    Json(postings): Json<Vec<PostingRecord>>,
) -> Result<Json<Vec<ClassifiedPosting>>, ApiError> {
    Ok(Json(state.ctx.classify(&postings)?))
}

async fn match_postings(
    State(state): State<AppState>,
    Json(req): Json<MatchReq>,
) -> Result<Json<MatchResp>, ApiError> {
    let k = state.ctx.n_clusters();
    if req.cluster.0 >= k {
        return Err(ApiError::BadRequest(format!(
            "cluster {} outside 0..{k}",
            req.cluster
        )));
    }
    let matched = match_cluster(&req.postings, req.cluster);
    Ok(Json(MatchResp {
        cluster: req.cluster,
        count: matched.len(),
        jobs: project(&matched),
    }))
}

async fn run(
    State(state): State<AppState>,
    Json(req): Json<CrawlReq>,
) -> Result<Json<RunResp>, ApiError> {
    check_pages(&state, req.pages)?;
    let report = state
        .crawler
        .crawl_report(&req.keyword, req.pages)
        .await
        .map_err(ApiError::Internal)?;

    let postings = state.ctx.classify(&report.postings)?;
    let clusters = cluster_summary(&postings);
    info!(
        keyword = %req.keyword,
        postings = postings.len(),
        clusters = clusters.len(),
        "run finished"
    );

    Ok(Json(RunResp {
        postings,
        clusters,
        n_clusters: state.ctx.n_clusters(),
        failed_pages: report.failed_pages,
    }))
}
