use crate::aggregate::aggregate;
use crate::errors::{AppError, SessionError};
use crate::models::{
    Credentials, DashboardResponse, LatestDateResponse, LoginResponse, MonthsQuery,
    ProviderVolume, RangeQuery, Record, RegisterResponse, ReloadResponse, SelectionQuery,
    ShowRate,
};
use crate::providers;
use crate::range::{self, DateRange, DateSelection};
use crate::state::AppState;
use crate::storage::read_records;
use crate::ui::{render_dashboard, render_login};
use crate::view::ViewState;
use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use chrono::{Local, NaiveDate, Utc};
use tracing::{info, warn};

const SESSION_HEADER: &str = "x-session-token";
const SESSION_COOKIE: &str = "session";

/// Dashboard page. Without a live session the browser is sent to the login
/// form.
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SelectionQuery>,
) -> Result<Response, AppError> {
    if authorize(&state, &headers).await.is_err() {
        return Ok(Redirect::to("/login").into_response());
    }

    let range = DateSelection::from_query(&query)?.resolve_at(today())?;
    let all_records = state.records.read().await;
    let records = range.select(&all_records);
    let metrics = aggregate(&records, &state.rates);
    let providers = providers::booked_by_provider(&records);
    let show_rate = providers::show_rate(&all_records, &range.months());
    Ok(Html(render_dashboard(&range, &metrics, &providers, &show_rate)).into_response())
}

pub async fn login_page() -> Html<String> {
    Html(render_login(None))
}

pub async fn login_form(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> Response {
    match login(&state, &credentials).await {
        Ok(session) => {
            let cookie = format!(
                "{SESSION_COOKIE}={}; HttpOnly; Path=/; SameSite=Strict",
                session.token
            );
            ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
        }
        Err(err) => (err.status, Html(render_login(Some(&err.message)))).into_response(),
    }
}

pub async fn register_form(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> Response {
    match register(&state, &credentials).await {
        Ok(_) => Redirect::to("/login").into_response(),
        Err(err) => (err.status, Html(render_login(Some(&err.message)))).into_response(),
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        end_session(&state, &token).await;
    }
    let cookie = format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Strict; Max-Age=0");
    ([(header::SET_COOKIE, cookie)], Redirect::to("/login")).into_response()
}

pub async fn api_register(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<RegisterResponse>, AppError> {
    Ok(Json(register(&state, &credentials).await?))
}

pub async fn api_login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(login(&state, &credentials).await?))
}

pub async fn close_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = session_token(&headers).ok_or(SessionError::Missing)?;
    end_session(&state, &token).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn live_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<Record>>, AppError> {
    authorize(&state, &headers).await?;
    let range = DateRange::parse(&query.start, &query.end)?;
    let records = range.select(&state.records.read().await);
    Ok(Json(records))
}

pub async fn booked_by_provider(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<ProviderVolume>>, AppError> {
    authorize(&state, &headers).await?;
    let range = DateRange::parse(&query.start, &query.end)?;
    let records = range.select(&state.records.read().await);
    Ok(Json(providers::booked_by_provider(&records)))
}

pub async fn metrics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    authorize(&state, &headers).await?;
    let range = DateSelection::from_query(&query)?.resolve_at(today())?;
    let records = range.select(&state.records.read().await);

    Ok(Json(DashboardResponse {
        start: range.start.to_string(),
        end: range.end.to_string(),
        metrics: aggregate(&records, &state.rates),
        providers: providers::booked_by_provider(&records),
    }))
}

pub async fn details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<Vec<Record>>, AppError> {
    authorize(&state, &headers).await?;
    let selection = DateSelection::from_query(&query)?;
    let range = selection.resolve_at(today())?;
    let records = range.select(&state.records.read().await);

    let mut view = ViewState::default().with_selection(selection);
    if let Some(status) = query.status.as_deref() {
        view = view.click_status(status);
    } else if let Some(provider) = query.provider.as_deref() {
        view = view.click_provider(provider);
    } else {
        return Err(AppError::bad_request("status or provider is required"));
    }

    Ok(Json(view.details(&records).into_iter().cloned().collect()))
}

pub async fn show_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MonthsQuery>,
) -> Result<Json<ShowRate>, AppError> {
    authorize(&state, &headers).await?;
    let months = range::parse_months(&query.months)?;
    let records = state.records.read().await;
    Ok(Json(providers::show_rate(&records, &months)))
}

pub async fn latest_date(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LatestDateResponse>, AppError> {
    authorize(&state, &headers).await?;
    let records = state.records.read().await;
    let date = range::latest_active_date(&records, today()).map(|date| date.to_string());
    Ok(Json(LatestDateResponse { date }))
}

/// Re-reads the record file. On failure the previously loaded records stay
/// in place.
pub async fn reload_records(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReloadResponse>, AppError> {
    authorize(&state, &headers).await?;
    let fresh = match read_records(&state.records_path).await {
        Ok(records) => records,
        Err(err) => {
            warn!("reload failed, keeping last known records: {}", err.message);
            return Err(err);
        }
    };

    let count = fresh.len();
    *state.records.write().await = fresh;
    info!("reloaded {count} records");
    Ok(Json(ReloadResponse { records: count }))
}

async fn register(
    state: &AppState,
    credentials: &Credentials,
) -> Result<RegisterResponse, AppError> {
    let tenant_id = state
        .accounts
        .lock()
        .await
        .register(&credentials.email, &credentials.password)?;
    info!("registered account for tenant {tenant_id}");
    Ok(RegisterResponse { tenant_id })
}

async fn login(state: &AppState, credentials: &Credentials) -> Result<LoginResponse, AppError> {
    let tenant_id = state
        .accounts
        .lock()
        .await
        .verify(&credentials.email, &credentials.password)?;
    let token = state.sessions.lock().await.open(&tenant_id, Utc::now());
    info!("opened session for tenant {tenant_id}");
    Ok(LoginResponse { tenant_id, token })
}

async fn end_session(state: &AppState, token: &str) {
    if let Some(session) = state.sessions.lock().await.close(token) {
        info!("closed session for tenant {}", session.tenant_id);
    }
}

/// Resolves the request's session to its tenant and records the activity.
async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    let token = session_token(headers).ok_or(SessionError::Missing)?;
    let tenant_id = state.sessions.lock().await.authorize(&token, Utc::now())?;
    Ok(tenant_id)
}

/// The `x-session-token` header, falling back to the `session` cookie.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
