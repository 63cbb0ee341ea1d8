use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the scoreboard backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::public::index,
        crate::routes::public::get_scoreboard,
        crate::routes::admin::update_dashboard,
        crate::routes::admin::reset_scoreboard,
        crate::routes::admin::declare_winner,
        crate::routes::sse::public_stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dao::models::ScoreBoard,
            crate::dao::models::Team,
            crate::dao::models::ScoreSet,
            crate::dto::scoreboard::DashboardForm,
            crate::dto::scoreboard::ScoreboardResponse,
            crate::dto::scoreboard::WinnerRequest,
            crate::dto::scoreboard::WinnerResponse,
            crate::dto::events::ScoreUpdateEvent,
            crate::dto::events::WinnerDeclaredEvent,
            crate::dao::visit_log::VisitRecord,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "public", description = "Public scoreboard views"),
        (name = "admin", description = "Session-gated scoreboard management"),
        (name = "viewers", description = "Live update channels for viewers"),
    )
)]
pub struct ApiDoc;
