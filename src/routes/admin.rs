use axum::{
    Form, Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header::SET_COOKIE},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tracing::warn;
use validator::Validate;

use crate::{
    dto::{
        admin::LoginForm,
        scoreboard::{DashboardForm, ScoreboardResponse, WinnerRequest, WinnerResponse},
    },
    error::{AppError, ServiceError},
    services::{
        scoreboard_service,
        session_service::{self, INVALID_CREDENTIALS},
        visit_service,
    },
    state::SharedState,
    views,
};

const REQUESTED_WITH_HEADER: &str = "x-requested-with";
const XHR: &str = "XMLHttpRequest";

/// Admin pages and actions. Everything except login, logout and winner declaration
/// is behind the session gate.
pub fn router(state: SharedState) -> Router<SharedState> {
    let gated = Router::new()
        .route("/admin/dashboard", get(dashboard).post(update_dashboard))
        .route("/admin/scoreboard", get(admin_scoreboard))
        .route("/admin/visits", get(list_visits))
        .route("/admin/reset", post(reset_scoreboard))
        .route_layer(middleware::from_fn_with_state(state, require_admin_session));

    Router::new()
        .route("/admin/login", get(login_form).post(login))
        .route("/admin/logout", get(logout))
        .route("/declare_winner", post(declare_winner))
        .merge(gated)
}

/// Show the login form.
pub async fn login_form() -> Html<String> {
    Html(views::login_page(None))
}

/// Check the operator credentials and open a session on success.
pub async fn login(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let outcome = match form.validate() {
        Ok(()) => session_service::login(&state, &form.username, &form.password),
        Err(err) => {
            warn!(error = %err, "rejected oversized login form");
            Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.into()))
        }
    };

    match outcome {
        Ok(token) => Ok((
            [(SET_COOKIE, session_service::session_cookie(&token))],
            Redirect::to("/admin/dashboard"),
        )
            .into_response()),
        Err(ServiceError::Unauthorized(message)) => Ok((
            StatusCode::UNAUTHORIZED,
            Html(views::login_page(Some(&message))),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}

/// Drop the session and return to the login form.
pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let token = session_service::token_from_headers(&headers);
    session_service::logout(&state, token.as_deref());
    (
        [(SET_COOKIE, session_service::cleared_session_cookie())],
        Redirect::to("/admin/login"),
    )
        .into_response()
}

/// Render the editing form with the current state and the visit log.
pub async fn dashboard(State(state): State<SharedState>) -> Html<String> {
    let board = scoreboard_service::get_state(&state).await;
    let visits = visit_service::list_visits(&state).await;
    Html(views::dashboard_page(&board, &visits))
}

#[utoipa::path(
    post,
    path = "/admin/dashboard",
    tag = "admin",
    request_body(content = DashboardForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Updated scoreboard (XMLHttpRequest callers)", body = ScoreboardResponse),
        (status = 303, description = "Redirect back to the dashboard (browser form posts)")
    )
)]
/// Apply a partial update from the dashboard form and notify viewers.
///
/// Only `application/x-www-form-urlencoded` bodies are accepted. A field sent twice
/// keeps its first value.
pub async fn update_dashboard(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let form = DashboardForm::from_pairs(pairs);
    let board = scoreboard_service::update(&state, form.into()).await?;

    let is_xhr = headers
        .get(REQUESTED_WITH_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == XHR);

    if is_xhr {
        Ok(Json(ScoreboardResponse::success(board)).into_response())
    } else {
        Ok(Redirect::to("/admin/dashboard").into_response())
    }
}

/// Scoreboard-only view for admins.
pub async fn admin_scoreboard(State(state): State<SharedState>) -> Html<String> {
    let board = scoreboard_service::get_state(&state).await;
    Html(views::admin_scoreboard_page(&board))
}

/// List every parsed visit.
pub async fn list_visits(State(state): State<SharedState>) -> Html<String> {
    let visits = visit_service::list_visits(&state).await;
    Html(views::visits_page(&visits))
}

#[utoipa::path(
    post,
    path = "/admin/reset",
    tag = "admin",
    responses((status = 200, description = "Scoreboard restored to defaults", body = ScoreboardResponse))
)]
/// Restore the default document.
pub async fn reset_scoreboard(
    State(state): State<SharedState>,
) -> Result<Json<ScoreboardResponse>, AppError> {
    let board = scoreboard_service::reset(&state).await?;
    Ok(Json(ScoreboardResponse::success(board)))
}

#[utoipa::path(
    post,
    path = "/declare_winner",
    tag = "admin",
    request_body = WinnerRequest,
    responses(
        (status = 200, description = "Winner recorded", body = WinnerResponse),
        (status = 401, description = "Admin session required")
    )
)]
/// Record the winner token and broadcast it.
///
/// Requires an admin session unless `public_winner_declaration` is configured.
pub async fn declare_winner(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Option<Json<WinnerRequest>>,
) -> Result<Json<WinnerResponse>, AppError> {
    if !state.config().public_winner_declaration {
        let token = session_service::token_from_headers(&headers);
        if !session_service::is_authenticated(&state, token.as_deref()) {
            warn!("winner declaration without admin session rejected");
            return Err(AppError::Unauthorized("admin session required".into()));
        }
    }

    let Json(request) = payload.unwrap_or_default();
    let board = scoreboard_service::declare_winner(&state, request.winner).await?;
    Ok(Json(WinnerResponse::success(board.winner)))
}

async fn require_admin_session(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_service::token_from_headers(req.headers());
    if session_service::is_authenticated(&state, token.as_deref()) {
        Ok(next.run(req).await)
    } else {
        Err(AppError::LoginRequired)
    }
}
