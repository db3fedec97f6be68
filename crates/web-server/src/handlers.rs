use crate::params::ReportParams;
use crate::{AppState, error::AppError, export};
use analytics::PerformanceRow;
use analyzer::TeamRanksAnalyzer;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate};
use core_types::{
    ContactFilters, DateField, DateRange, EnrollmentFilters, LeadFilters, MarketingFilters,
    NegotiatorFilters, Page, ProgramCompletionFilters, TeamRanksFilters, TerminalEvent, resolve,
};
use database::reports::contact::{self, ContactQuery};
use database::reports::enrollment::{self, EnrollmentQuery};
use database::reports::lead::{self, LeadQuery};
use database::reports::marketing::{self, CostField, MarketingQuery, MarketingRow};
use database::reports::negotiator::{self, NegotiatorQuery};
use database::reports::program_completion::{ProgramCompletionQuery, ProgramCompletionRow};
use database::reports::team_ranks::{self, TeamRanksQuery};
use database::reports::terminal::{self, TerminalQuery};
use database::reports::tranche::TrancheQuery;
use database::{FilterOptions, ReportQuery};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The JSON body every report page returns.
#[derive(Debug, Serialize)]
pub struct ReportResponse<T, F> {
    pub reports: Page<T>,
    pub options: FilterOptions,
    pub range: DateRange,
    pub filters: F,
}

#[derive(Debug, Serialize)]
pub struct TeamRanksResponse {
    pub reports: Page<PerformanceRow>,
    pub teams: Vec<PerformanceRow>,
    pub company: PerformanceRow,
    pub options: FilterOptions,
    pub range: DateRange,
    pub filters: TeamRanksFilters,
}

#[derive(Debug, Serialize)]
pub struct DataMeta {
    pub total: i64,
    pub per_page: i64,
    pub current_page: i64,
    pub last_page: i64,
    pub range: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
    pub meta: DataMeta,
}

/// Body of a marketing cost update. Only the field matching the route is read.
#[derive(Debug, Default, Deserialize)]
pub struct CostUpdate {
    pub mail_drop_cost: Option<Decimal>,
    pub data_drop_cost: Option<Decimal>,
}

impl CostUpdate {
    fn value(&self, field: CostField) -> Option<Decimal> {
        match field {
            CostField::Mail => self.mail_drop_cost,
            CostField::Data => self.data_drop_cost,
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Every row of `query` as a CSV download, buffered in memory before sending.
async fn export_all<Q>(
    state: &AppState,
    query: &Q,
    prefix: &str,
    write: fn(&[Q::Row]) -> Result<Vec<u8>, AppError>,
) -> Result<Response, AppError>
where
    Q: ReportQuery,
{
    let rows = state.db_repo.all(query).await?;
    tracing::info!(report = prefix, rows = rows.len(), "Exporting report");
    Ok(export::csv_response(prefix, write(&rows)?))
}

async fn page_of<Q>(state: &AppState, params: &ReportParams, query: &Q) -> Result<Page<Q::Row>, AppError>
where
    Q: ReportQuery,
{
    let page = params.page_request(&state.settings.reports);
    Ok(state.db_repo.paginate(query, page).await?)
}

fn respond<T: Serialize, F: Serialize>(reports: Page<T>, options: FilterOptions, range: DateRange, filters: F) -> Response {
    Json(ReportResponse { reports, options, range, filters }).into_response()
}

/// # GET /reports/lead
pub async fn lead_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
    Query(filters): Query<LeadFilters>,
) -> Result<Response, AppError> {
    let query = LeadQuery { range: params.range(today()), filters };
    if params.wants_csv() {
        return export_all(&state, &query, "lead_reports", export::leads).await;
    }

    let reports = page_of(&state, &params, &query).await?;
    let mut options = state.db_repo.options(&lead::OPTIONS, &state.settings.reports).await?;
    options.insert("debt_tiers", lead::tier_options());
    Ok(respond(reports, options, query.range, query.filters))
}

/// # GET /reports/contact
/// Explicit bounds filter the assignment date; the range token alone filters
/// the creation date.
pub async fn contact_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
    Query(filters): Query<ContactFilters>,
) -> Result<Response, AppError> {
    let query = ContactQuery {
        assigned: params.explicit(),
        created: resolve(params.token(), None, None, today()),
        filters,
    };
    if params.wants_csv() {
        return export_all(&state, &query, "contact_reports", export::contacts).await;
    }

    let reports = page_of(&state, &params, &query).await?;
    let options = state.db_repo.options(&contact::OPTIONS, &state.settings.reports).await?;
    Ok(respond(reports, options, query.created, query.filters))
}

/// # GET /reports/enrollment
pub async fn enrollment_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
    Query(filters): Query<EnrollmentFilters>,
) -> Result<Response, AppError> {
    let query = EnrollmentQuery {
        range: params.range(today()),
        date_field: params.date_by.unwrap_or(DateField::Submitted),
        filters,
    };
    if params.wants_csv() {
        return export_all(&state, &query, "enrollment_reports", export::enrollments).await;
    }

    let reports = page_of(&state, &params, &query).await?;
    let options = state.db_repo.options(&enrollment::OPTIONS, &state.settings.reports).await?;
    Ok(respond(reports, options, query.range, query.filters))
}

/// Shared by the cancel and NSF reports. `from`/`to` bound the event date; a
/// range token bounds the submitted date.
async fn terminal_report(
    state: &AppState,
    event: TerminalEvent,
    params: ReportParams,
    filters: EnrollmentFilters,
) -> Result<Response, AppError> {
    let submitted_range = match params.token() {
        Some(token) => resolve(Some(token), params.from, params.to, today()),
        None => DateRange::default(),
    };
    let query = TerminalQuery {
        event,
        event_range: params.explicit(),
        submitted_range,
        filters,
    };
    if params.wants_csv() {
        let prefix = format!("{}_reports", event.slug());
        return export_all(state, &query, &prefix, export::terminal).await;
    }

    let reports = page_of(state, &params, &query).await?;
    let options = state.db_repo.options(&terminal::options(event), &state.settings.reports).await?;
    Ok(respond(reports, options, query.submitted_range, query.filters))
}

/// # GET /reports/cancel
pub async fn cancel_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
    Query(filters): Query<EnrollmentFilters>,
) -> Result<Response, AppError> {
    terminal_report(&state, TerminalEvent::Cancel, params, filters).await
}

/// # GET /reports/nsf
pub async fn nsf_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
    Query(filters): Query<EnrollmentFilters>,
) -> Result<Response, AppError> {
    terminal_report(&state, TerminalEvent::Nsf, params, filters).await
}

/// # GET /reports/marketing
pub async fn marketing_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
    Query(filters): Query<MarketingFilters>,
) -> Result<Response, AppError> {
    let query = MarketingQuery { range: params.range(today()), filters, pk: None };
    if params.wants_csv() {
        return export_all(&state, &query, "marketing_reports", export::marketing).await;
    }

    let reports = page_of(&state, &params, &query).await?;
    let options = state.db_repo.options(&marketing::OPTIONS, &state.settings.reports).await?;
    Ok(respond(reports, options, query.range, query.filters))
}

async fn update_cost(
    state: &AppState,
    field: CostField,
    pk: i64,
    body: CostUpdate,
) -> Result<Json<MarketingRow>, AppError> {
    let cost = body
        .value(field)
        .ok_or_else(|| AppError::Validation(format!("{} is required", field.column())))?;
    if cost < Decimal::ZERO {
        return Err(AppError::Validation(format!("{} must be at least 0", field.column())));
    }

    let row = state.db_repo.update_drop_cost(field, pk, cost).await?;
    Ok(Json(row))
}

/// # PATCH /reports/marketing/:pk/mail
pub async fn update_mail_cost(
    State(state): State<Arc<AppState>>,
    Path(pk): Path<i64>,
    Json(body): Json<CostUpdate>,
) -> Result<Json<MarketingRow>, AppError> {
    update_cost(&state, CostField::Mail, pk, body).await
}

/// # PATCH /reports/marketing/:pk/data
pub async fn update_data_cost(
    State(state): State<Arc<AppState>>,
    Path(pk): Path<i64>,
    Json(body): Json<CostUpdate>,
) -> Result<Json<MarketingRow>, AppError> {
    update_cost(&state, CostField::Data, pk, body).await
}

fn completion_query(params: &ReportParams, filters: ProgramCompletionFilters) -> ProgramCompletionQuery {
    ProgramCompletionQuery { range: params.range_or("all", today()), filters }
}

/// # GET /reports/program-completion
pub async fn program_completion_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
    Query(filters): Query<ProgramCompletionFilters>,
) -> Result<Response, AppError> {
    let query = completion_query(&params, filters);
    if params.wants_csv() {
        return export_all(&state, &query, "program_completion_report", export::program_completion).await;
    }

    let reports = page_of(&state, &params, &query).await?;
    Ok(respond(reports, FilterOptions::new(), query.range, query.filters))
}

/// # GET /reports/program-completion/data
/// The same page in the flat `data` + `meta` shape used by table widgets.
pub async fn program_completion_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
    Query(filters): Query<ProgramCompletionFilters>,
) -> Result<Json<DataResponse<ProgramCompletionRow>>, AppError> {
    let query = completion_query(&params, filters);
    let page = page_of(&state, &params, &query).await?;
    let meta = DataMeta {
        total: page.total,
        per_page: page.per_page,
        current_page: page.current_page,
        last_page: page.last_page,
        range: query.range.token.clone(),
        from: query.range.from,
        to: query.range.to,
    };
    Ok(Json(DataResponse { data: page.data, meta }))
}

/// # GET /reports/tranche-summary
pub async fn tranche_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
) -> Result<Response, AppError> {
    let query = TrancheQuery::new(params.range(today()), state.settings.tranche.epf_payee_ids.clone());
    if params.wants_csv() {
        return export_all(&state, &query, "tranche_summary", export::tranches).await;
    }

    let reports = page_of(&state, &params, &query).await?;
    Ok(respond(reports, FilterOptions::new(), query.range, ()))
}

/// # GET /reports/team-ranks
/// Agents are ranked across the whole window, then paged in memory.
pub async fn team_ranks_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
    Query(filters): Query<TeamRanksFilters>,
) -> Result<Response, AppError> {
    let analyzer = TeamRanksAnalyzer::new(state.settings.team_ranks.clone());
    let range = analyzer.window(params.token(), params.from, params.to, today());
    let query = TeamRanksQuery {
        range,
        data_source: filters.data_source().map(str::to_string),
    };
    let ranks = analyzer.run(&state.db_repo, &query).await?;

    if params.wants_csv() {
        tracing::info!(report = "team_ranks", rows = ranks.agents.len(), "Exporting report");
        return Ok(export::csv_response("team_ranks", export::team_ranks(&ranks)?));
    }

    let mut options = state.db_repo.options(&team_ranks::OPTIONS, &state.settings.reports).await?;
    let sources = options.remove("data_sources").unwrap_or_default();
    options.insert("data_sources", analyzer::data_source_options(sources));

    let page = params.page_request(&state.settings.reports);
    Ok(Json(TeamRanksResponse {
        reports: Page::from_vec(ranks.agents, page),
        teams: ranks.teams,
        company: ranks.company,
        options,
        range: query.range,
        filters,
    })
    .into_response())
}

/// # GET /reports/negotiator
pub async fn negotiator_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
    Query(filters): Query<NegotiatorFilters>,
) -> Result<Response, AppError> {
    let mut query = NegotiatorQuery::new(today());
    query.range = params.range(query.today);
    query.date_field = params.date_field.unwrap_or(DateField::Payment);
    query.filters = filters;
    if params.wants_csv() {
        return export_all(&state, &query, "negotiator_report", export::negotiators).await;
    }

    let reports = page_of(&state, &params, &query).await?;
    let limits = &state.settings.reports;
    let mut options = state.db_repo.options(&negotiator::ENROLLMENT_OPTIONS, limits).await?;
    options.extend(state.db_repo.options(&negotiator::ASSIGNMENT_OPTIONS, limits).await?);
    Ok(respond(reports, options, query.range, query.filters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cost_updates_read_the_routed_field() {
        let body: CostUpdate = serde_json::from_str(r#"{"mail_drop_cost": 1250.5}"#).unwrap();
        assert_eq!(body.value(CostField::Mail), Some(dec!(1250.5)));
        assert_eq!(body.value(CostField::Data), None);
    }

    #[test]
    fn program_completion_defaults_to_every_date() {
        let query = completion_query(&ReportParams::default(), ProgramCompletionFilters::default());
        assert!(query.range.is_unbounded());
        assert_eq!(query.range.token.as_deref(), Some("all"));
    }
}
