use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::engine::filter::{apply_filters, filter_counts, sort_cards, ProgressFilter, SortOrder};
use crate::engine::types::{CohortSummary, ProgressCard};
use crate::engine::EngineError;
use crate::response::AppError;
use crate::state::AppState;
use crate::store::StoreError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(overview))
        .route("/students/:id", get(student_card))
        .route("/filters", get(list_filters))
}

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverviewQuery {
    organization_code: String,
    /// Comma-separated filter names; AND-combined.
    filters: Option<String>,
    sort: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OverviewData {
    students: Vec<ProgressCard>,
    summary: CohortSummary,
    /// Match counts per filter over the unfiltered cohort, so the UI can
    /// render chip counts consistent with the card flags.
    filter_counts: BTreeMap<&'static str, usize>,
}

async fn overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = parse_filters(query.filters.as_deref())?;
    let sort = parse_sort(query.sort.as_deref())?;

    let cohort = state
        .engine()
        .aggregate(&query.organization_code)
        .await
        .map_err(map_engine_error)?;

    let counts = filter_counts(&cohort.students);
    let mut students = apply_filters(cohort.students, &filters);
    if let Some(order) = sort {
        sort_cards(&mut students, order);
    }

    Ok(Json(SuccessResponse {
        success: true,
        data: OverviewData {
            students,
            summary: cohort.summary,
            filter_counts: counts,
        },
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentQuery {
    organization_code: String,
}

async fn student_card(
    State(state): State<AppState>,
    Path(learner_id): Path<String>,
    Query(query): Query<StudentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let card = state
        .engine()
        .learner_card(&query.organization_code, &learner_id)
        .await
        .map_err(map_engine_error)?
        .ok_or_else(|| AppError::not_found("student not found in this organization"))?;

    Ok(Json(SuccessResponse {
        success: true,
        data: card,
    }))
}

#[derive(Serialize)]
struct FilterInfo {
    id: &'static str,
    description: &'static str,
}

async fn list_filters() -> impl IntoResponse {
    let filters: Vec<FilterInfo> = ProgressFilter::ALL
        .iter()
        .map(|filter| FilterInfo {
            id: filter.as_str(),
            description: filter.description(),
        })
        .collect();

    Json(SuccessResponse {
        success: true,
        data: filters,
    })
}

fn parse_filters(raw: Option<&str>) -> Result<Vec<ProgressFilter>, AppError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            ProgressFilter::parse(name)
                .ok_or_else(|| AppError::validation(format!("unknown filter: {name}")))
        })
        .collect()
}

fn parse_sort(raw: Option<&str>) -> Result<Option<SortOrder>, AppError> {
    match raw {
        None => Ok(None),
        Some(name) => SortOrder::parse(name)
            .map(Some)
            .ok_or_else(|| AppError::validation(format!("unknown sort order: {name}"))),
    }
}

fn map_engine_error(err: EngineError) -> AppError {
    match err {
        EngineError::CohortLookup(StoreError::OrganizationNotFound(code)) => {
            AppError::not_found(format!("organization not found: {code}"))
        }
        EngineError::CohortLookup(other) => {
            tracing::error!(error = %other, "cohort membership fetch failed");
            AppError::internal("failed to load progress data")
        }
    }
}
