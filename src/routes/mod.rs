use axum::Router;

use crate::state::SharedState;

pub mod admin;
pub mod docs;
pub mod health;
pub mod public;
pub mod sse;
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    public::router()
        .merge(admin::router(state.clone()))
        .merge(health::router())
        .merge(sse::router())
        .merge(websocket::router())
        .merge(docs::router())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{
            Method, Request, StatusCode,
            header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        },
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::models::ScoreBoard,
        services::visit_service::{self, VisitContext},
        test_support::{lisbon, state_with, test_state},
    };

    const FORM: &str = "application/x-www-form-urlencoded";

    async fn body_text(res: Response) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn json_body(res: Response) -> Value {
        serde_json::from_str(&body_text(res).await).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn form_post(uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, FORM)
    }

    /// Log in and return the `name=value` pair to send back as a cookie.
    async fn login(app: &Router) -> String {
        let res = app
            .clone()
            .oneshot(
                form_post("/admin/login")
                    .body(Body::from("username=admin&password=1234"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[LOCATION], "/admin/dashboard");
        let cookie = res.headers()[SET_COOKIE].to_str().unwrap();
        cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn api_returns_default_document() {
        let (state, _dir) = test_state();
        let res = router(state).oneshot(get("/api/scoreboard")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            json_body(res).await,
            json!({
                "team1": {"name": "Team 1", "score": {"red": 0, "white": 0, "gray": 0}},
                "team2": {"name": "Team 2", "score": {"red": 0, "white": 0, "gray": 0}},
                "winner": null
            })
        );
    }

    #[tokio::test]
    async fn index_renders_current_names() {
        let mut board = ScoreBoard::default();
        board.team1.name = "Gulls".into();
        let (state, _dir) = state_with(board, AppConfig::default(), Some(lisbon()));
        let res = router(state).oneshot(get("/?screen=390x844")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let page = body_text(res).await;
        assert!(page.contains("Gulls"));
        assert!(page.contains("/ws"));
    }

    #[tokio::test]
    async fn admin_pages_redirect_to_login_without_session() {
        let (state, _dir) = test_state();
        let app = router(state);
        for uri in ["/admin/dashboard", "/admin/visits", "/admin/scoreboard"] {
            let res = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(res.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(res.headers()[LOCATION], "/admin/login");
        }

        let res = app
            .oneshot(
                form_post("/admin/dashboard")
                    .body(Body::from("team1_name=Intruders"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn wrong_credentials_rerender_login_form() {
        let (state, _dir) = test_state();
        let res = router(state.clone())
            .oneshot(
                form_post("/admin/login")
                    .body(Body::from("username=admin&password=nope"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(SET_COOKIE).is_none());
        assert!(body_text(res).await.contains("Invalid credentials"));
        assert!(state.sessions().is_empty());
    }

    #[tokio::test]
    async fn oversized_credentials_rerender_login_form() {
        let (state, _dir) = test_state();
        let body = format!("username={}&password=1234", "a".repeat(200));
        let res = router(state.clone())
            .oneshot(form_post("/admin/login").body(Body::from(body)).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(
            res.headers()[CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
        assert!(body_text(res).await.contains("Invalid credentials"));
        assert!(state.sessions().is_empty());
    }

    #[tokio::test]
    async fn repeated_dashboard_field_keeps_first_value() {
        let (state, _dir) = test_state();
        let app = router(state.clone());
        let cookie = login(&app).await;

        let res = app
            .oneshot(
                form_post("/admin/dashboard")
                    .header(COOKIE, &cookie)
                    .header("X-Requested-With", "XMLHttpRequest")
                    .body(Body::from("team1_name=A&team1_name=B&team1_red=3"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["scoreboard"]["team1"]["name"], "A");
        assert_eq!(body["scoreboard"]["team1"]["score"]["red"], 3);
        assert_eq!(state.store().load().await.team1.name, "A");
    }

    #[tokio::test]
    async fn dashboard_accepts_only_urlencoded_bodies() {
        let (state, _dir) = test_state();
        let app = router(state.clone());
        let cookie = login(&app).await;

        let res = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/admin/dashboard")
                    .header(COOKIE, &cookie)
                    .header(CONTENT_TYPE, "multipart/form-data; boundary=X")
                    .body(Body::from(
                        "--X\r\nContent-Disposition: form-data; name=\"team1_name\"\r\n\r\nA\r\n--X--\r\n",
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(state.store().load().await, ScoreBoard::default());
    }

    #[tokio::test]
    async fn xhr_dashboard_post_returns_json_echo() {
        let (state, _dir) = test_state();
        let app = router(state.clone());
        let cookie = login(&app).await;

        let res = app
            .clone()
            .oneshot(
                form_post("/admin/dashboard")
                    .header(COOKIE, &cookie)
                    .header("X-Requested-With", "XMLHttpRequest")
                    .body(Body::from(
                        "team1_name=&team2_name=Badgers&team1_red=abc&team1_white=3&team2_gray=5",
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = json_body(res).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["scoreboard"]["team1"]["name"], "");
        assert_eq!(body["scoreboard"]["team1"]["score"]["red"], 0);
        assert_eq!(body["scoreboard"]["team1"]["score"]["white"], 3);
        assert_eq!(body["scoreboard"]["team2"]["name"], "Badgers");
        assert_eq!(body["scoreboard"]["team2"]["score"]["gray"], 5);

        let stored = app.oneshot(get("/api/scoreboard")).await.unwrap();
        assert_eq!(json_body(stored).await, body["scoreboard"]);
    }

    #[tokio::test]
    async fn browser_dashboard_post_redirects_back() {
        let (state, _dir) = test_state();
        let app = router(state.clone());
        let cookie = login(&app).await;

        let res = app
            .oneshot(
                form_post("/admin/dashboard")
                    .header(COOKIE, &cookie)
                    .body(Body::from("team2_red=2"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[LOCATION], "/admin/dashboard");

        let board = state.store().load().await;
        assert_eq!(board.team2.score.red, 2);
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let (state, _dir) = test_state();
        let app = router(state.clone());
        let cookie = login(&app).await;

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/admin/logout")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(
            res.headers()[SET_COOKIE]
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );
        assert!(state.sessions().is_empty());

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/admin/dashboard")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.headers()[LOCATION], "/admin/login");
    }

    #[tokio::test]
    async fn declare_winner_requires_session_by_default() {
        let (state, _dir) = test_state();
        let app = router(state.clone());
        let request = || {
            Request::builder()
                .method(Method::POST)
                .uri("/declare_winner")
                .header(CONTENT_TYPE, "application/json")
        };

        let res = app
            .clone()
            .oneshot(request().body(Body::from(r#"{"winner":"team1"}"#)).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(state.store().load().await.winner, None);

        let cookie = login(&app).await;
        let res = app
            .oneshot(
                request()
                    .header(COOKIE, &cookie)
                    .body(Body::from(r#"{"winner":"team1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            json_body(res).await,
            json!({"status": "success", "winner": "team1"})
        );
        assert_eq!(state.store().load().await.winner.as_deref(), Some("team1"));
    }

    #[tokio::test]
    async fn declare_winner_can_be_opened_to_the_public() {
        let config = AppConfig {
            public_winner_declaration: true,
            ..AppConfig::default()
        };
        let (state, _dir) = state_with(ScoreBoard::default(), config, Some(lisbon()));
        let mut events = state.hub().subscribe();

        let res = router(state.clone())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/declare_winner")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"winner":"team2"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(events.recv().await.unwrap().event, "winner_declared");
        assert_eq!(events.recv().await.unwrap().event, "score_update");
    }

    #[tokio::test]
    async fn visits_page_lists_logged_visits() {
        let (state, _dir) = test_state();
        visit_service::record_visit(
            &state,
            VisitContext::page_view(
                "192.0.2.44".parse().unwrap(),
                Some("Firefox/128.0".into()),
                None,
            ),
        )
        .await
        .unwrap();

        let app = router(state);
        let cookie = login(&app).await;
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/admin/visits")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let page = body_text(res).await;
        assert!(page.contains("192.0.2.44"));
        assert!(page.contains("Firefox/128.0"));
        assert!(page.contains("Lisbon, Lisbon, Portugal"));
    }

    #[tokio::test]
    async fn reset_restores_default_document() {
        let mut board = ScoreBoard::default();
        board.team1.score.red = 11;
        let (state, _dir) = state_with(board, AppConfig::default(), Some(lisbon()));
        let app = router(state.clone());
        let cookie = login(&app).await;

        let res = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/admin/reset")
                    .header(COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(state.store().load().await, ScoreBoard::default());
    }

    #[tokio::test]
    async fn healthcheck_reports_viewers() {
        let (state, _dir) = test_state();
        let res = router(state).oneshot(get("/healthcheck")).await.unwrap();
        assert_eq!(
            json_body(res).await,
            json!({"status": "ok", "viewers": 0, "subscribers": 0})
        );
    }
}
