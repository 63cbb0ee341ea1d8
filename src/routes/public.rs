use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    Json, Router,
    extract::{ConnectInfo, Query, Request, State},
    http::{HeaderMap, header::USER_AGENT},
    response::Html,
    routing::get,
};

use crate::{
    dao::models::ScoreBoard,
    dto::scoreboard::ViewQuery,
    services::{
        scoreboard_service,
        visit_service::{self, VisitContext},
    },
    state::SharedState,
    views,
};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Public read-only endpoints exposing the scoreboard.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/api/scoreboard", get(get_scoreboard))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "public",
    params(ViewQuery),
    responses((status = 200, description = "Rendered scoreboard page", content_type = "text/html", body = String))
)]
/// Render the public scoreboard and log the visit in the background.
pub async fn index(
    State(state): State<SharedState>,
    Query(query): Query<ViewQuery>,
    request: Request,
) -> Html<String> {
    let ip = client_ip(&request);
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    visit_service::spawn_visit(
        state.clone(),
        VisitContext::page_view(ip, user_agent, query.screen),
    );

    let board = scoreboard_service::get_state(&state).await;
    Html(views::index_page(&board))
}

#[utoipa::path(
    get,
    path = "/api/scoreboard",
    tag = "public",
    responses((status = 200, description = "Current scoreboard document", body = ScoreBoard))
)]
/// Return the scoreboard document as stored.
pub async fn get_scoreboard(State(state): State<SharedState>) -> Json<ScoreBoard> {
    Json(scoreboard_service::get_state(&state).await)
}

/// Peer address of the connection, then the first forwarded hop, then unspecified.
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .or_else(|| forwarded_ip(request.headers()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get(FORWARDED_FOR)?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}
