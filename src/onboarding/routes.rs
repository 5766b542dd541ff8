//! HTTP routes: server-rendered wizard pages plus a JSON API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Extension, Form, Json, Router,
    extract::{Path, Request, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

use super::controller::{StepController, SubmitOutcome};
use super::progress::{Progress, progress};
use super::render::Renderer;
use super::session::{SessionId, SessionRegistry, session_cookie, session_from_jar};
use super::step::{Position, Step};
use crate::config::WizardConfig;
use crate::error::{RenderError, Result};

/// State shared across handlers.
#[derive(Clone)]
pub struct WizardState {
    pub sessions: Arc<SessionRegistry>,
    pub renderer: Arc<Renderer>,
    pub enforce_step_order: bool,
}

impl WizardState {
    pub fn new(config: &WizardConfig) -> Result<Self> {
        Ok(Self {
            sessions: SessionRegistry::new(config.session_idle_timeout()),
            renderer: Arc::new(Renderer::new()?),
            enforce_step_order: config.enforce_step_order,
        })
    }

    /// Where to send a request for `step` instead of serving it, if the
    /// step is locked and ordering is enforced.
    fn locked_step_redirect(&self, step: Step, progress: &Progress) -> Option<Position> {
        (self.enforce_step_order && !progress.is_enabled(step)).then(|| progress.resume_position())
    }

    fn locked_completion_redirect(&self, progress: &Progress) -> Option<Position> {
        (self.enforce_step_order && !progress.all_completed()).then(|| progress.resume_position())
    }
}

/// Build the wizard router.
pub fn wizard_routes(state: WizardState) -> Router {
    let api = Router::new()
        .route("/api/onboarding/status", get(api_status))
        .route(
            "/api/onboarding/steps/{step}",
            get(api_load_step).post(api_submit_step),
        )
        .layer(CorsLayer::permissive());

    Router::new()
        .route("/", get(redirect_to_start))
        .route("/onboarding", get(redirect_to_start))
        .route("/onboarding/{step}", get(show_step).post(submit_step))
        .route("/completed", get(show_completed))
        .merge(api)
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Session ─────────────────────────────────────────────────────────────

/// Resolve the caller's session id and hand it to the handler. The cookie is
/// only issued once the handler has registered the session by writing to it.
async fn session_layer(State(state): State<WizardState>, mut req: Request, next: Next) -> Response {
    let presented = session_from_jar(&CookieJar::from_headers(req.headers()));

    let (session, known) = state.sessions.resolve(presented).await;
    req.extensions_mut().insert(session);

    let mut response = next.run(req).await;
    if !known && state.sessions.contains(session).await {
        match HeaderValue::from_str(&session_cookie(session).to_string()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(session = %session, error = %e, "Could not build session cookie"),
        }
    }
    response
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "onboarding-wizard"
    }))
}

// ── HTML pages ──────────────────────────────────────────────────────────

async fn redirect_to_start() -> Redirect {
    Redirect::to(&Position::START.path())
}

fn html_page(status: StatusCode, rendered: std::result::Result<String, RenderError>) -> Response {
    match rendered {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn unknown_step_page() -> Response {
    (StatusCode::NOT_FOUND, Html("<h1>Not found</h1>")).into_response()
}

async fn show_step(
    State(state): State<WizardState>,
    Extension(session): Extension<SessionId>,
    Path(slug): Path<String>,
) -> Response {
    let Ok(step) = slug.parse::<Step>() else {
        return unknown_step_page();
    };
    let controller = StepController::new(step);

    let (form, progress) = state
        .sessions
        .read(session, |store| (controller.load(store), progress(store.record())))
        .await;

    if let Some(target) = state.locked_step_redirect(step, &progress) {
        return Redirect::to(&target.path()).into_response();
    }

    html_page(StatusCode::OK, state.renderer.render_step(&form, &progress))
}

async fn submit_step(
    State(state): State<WizardState>,
    Extension(session): Extension<SessionId>,
    Path(slug): Path<String>,
    Form(input): Form<HashMap<String, String>>,
) -> Response {
    let Ok(step) = slug.parse::<Step>() else {
        return unknown_step_page();
    };
    let controller = StepController::new(step);

    let result = state
        .sessions
        .with_store(session, |store| {
            let before = progress(store.record());
            if let Some(target) = state.locked_step_redirect(step, &before) {
                return Err(target);
            }
            let outcome = controller.submit(store, &input);
            Ok((outcome, progress(store.record())))
        })
        .await;

    match result {
        Err(target) => Redirect::to(&target.path()).into_response(),
        Ok((SubmitOutcome::Advanced { next, .. }, _)) => Redirect::to(&next.path()).into_response(),
        Ok((SubmitOutcome::Rejected { form, .. }, progress)) => html_page(
            StatusCode::UNPROCESSABLE_ENTITY,
            state.renderer.render_step(&form, &progress),
        ),
    }
}

async fn show_completed(
    State(state): State<WizardState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    let progress = progress(&state.sessions.snapshot(session).await);
    if let Some(target) = state.locked_completion_redirect(&progress) {
        return Redirect::to(&target.path()).into_response();
    }
    html_page(StatusCode::OK, state.renderer.render_completed())
}

// ── JSON API ────────────────────────────────────────────────────────────

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn api_status(
    State(state): State<WizardState>,
    Extension(session): Extension<SessionId>,
) -> impl IntoResponse {
    let record = state.sessions.snapshot(session).await;
    let progress = progress(&record);
    Json(serde_json::json!({
        "record": record,
        "progress": progress,
        "position": progress.resume_position(),
    }))
}

async fn api_load_step(
    State(state): State<WizardState>,
    Extension(session): Extension<SessionId>,
    Path(slug): Path<String>,
) -> Response {
    let Ok(step) = slug.parse::<Step>() else {
        return json_error(StatusCode::NOT_FOUND, "unknown step");
    };
    let controller = StepController::new(step);

    let (form, progress) = state
        .sessions
        .read(session, |store| (controller.load(store), progress(store.record())))
        .await;

    if state.locked_step_redirect(step, &progress).is_some() {
        return json_error(StatusCode::CONFLICT, "step not enabled");
    }
    Json(form).into_response()
}

async fn api_submit_step(
    State(state): State<WizardState>,
    Extension(session): Extension<SessionId>,
    Path(slug): Path<String>,
    input: std::result::Result<Json<HashMap<String, String>>, JsonRejection>,
) -> Response {
    let Ok(step) = slug.parse::<Step>() else {
        return json_error(StatusCode::NOT_FOUND, "unknown step");
    };
    let Json(input) = match input {
        Ok(input) => input,
        Err(rejection) => return json_error(rejection.status(), &rejection.body_text()),
    };
    let controller = StepController::new(step);

    let result = state
        .sessions
        .with_store(session, |store| {
            let before = progress(store.record());
            if state.locked_step_redirect(step, &before).is_some() {
                return None;
            }
            Some(controller.submit(store, &input))
        })
        .await;

    match result {
        None => json_error(StatusCode::CONFLICT, "step not enabled"),
        Some(SubmitOutcome::Advanced { next, stored }) => Json(serde_json::json!({
            "next": next.path(),
            "position": next,
            "completed": next.is_terminal(),
            "stored": stored,
        }))
        .into_response(),
        Some(SubmitOutcome::Rejected { error, .. }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": error.to_string(),
                "violations": error.violations,
            })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(enforce_step_order: bool) -> Router {
        let config = WizardConfig {
            enforce_step_order,
            ..WizardConfig::default()
        };
        wizard_routes(WizardState::new(&config).unwrap())
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn root_redirects_to_company_profile() {
        let response = app(false)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/onboarding/company-profile");
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn onboarding_index_redirects_too() {
        let response = app(false)
            .oneshot(Request::get("/onboarding").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/onboarding/company-profile");
    }

    #[tokio::test]
    async fn health_does_not_open_a_session() {
        let response = app(false)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn unknown_step_is_404() {
        let response = app(false)
            .oneshot(Request::get("/onboarding/billing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn later_step_served_when_order_not_enforced() {
        let response = app(false)
            .oneshot(Request::get("/onboarding/invite-users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"name="inviteUsers""#));
        assert!(html.contains(r#"<span class="disabled">Invite users</span>"#));
    }

    #[tokio::test]
    async fn later_step_redirected_when_order_enforced() {
        let response = app(true)
            .oneshot(Request::get("/onboarding/personas").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/onboarding/company-profile");
    }

    #[tokio::test]
    async fn completed_guarded_when_order_enforced() {
        let response = app(true)
            .oneshot(Request::get("/completed").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app(false)
            .oneshot(Request::get("/completed").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("You are ready to go!"));
    }

    #[tokio::test]
    async fn form_post_success_redirects_to_next_step() {
        let response = app(false)
            .oneshot(
                Request::post("/onboarding/company-profile")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("companyName=Acme&website=https%3A%2F%2Facme.com"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/onboarding/personas");
    }

    #[tokio::test]
    async fn form_post_failure_rerenders_with_errors() {
        let response = app(false)
            .oneshot(
                Request::post("/onboarding/invite-users")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("inviteUsers=not-an-email"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Invalid email"));
        assert!(html.contains(r#"value="not-an-email""#));
    }

    #[tokio::test]
    async fn api_submit_reports_violations() {
        let response = app(false)
            .oneshot(
                Request::post("/api/onboarding/steps/personas")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"personasTitle":"x","personasKey":"ok"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        let violations = json["violations"].as_array().unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0]["field"], "personasTitle");
        assert_eq!(violations[0]["rule"], "too_short");
        assert_eq!(violations[0]["message"], "Title must be at least 2 characters");
    }

    #[tokio::test]
    async fn api_submit_locked_step_conflicts_when_enforced() {
        let response = app(true)
            .oneshot(
                Request::post("/api/onboarding/steps/invite-users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"inviteUsers":"team@acme.com"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn api_status_on_fresh_session() {
        let response = app(false)
            .oneshot(Request::get("/api/onboarding/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["record"], serde_json::json!({}));
        assert_eq!(json["progress"][0]["enabled"], true);
        assert_eq!(json["progress"][1]["enabled"], false);
        assert_eq!(json["position"]["step"], "company-profile");
    }

    #[tokio::test]
    async fn api_malformed_body_is_json_error() {
        let response = app(false)
            .oneshot(
                Request::post("/api/onboarding/steps/personas")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"personasTitle":5,"personasKey":"ok"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(json["error"].as_str().unwrap().contains("personasTitle"));
    }

    #[tokio::test]
    async fn api_submit_reports_stored_values() {
        let response = app(false)
            .oneshot(
                Request::post("/api/onboarding/steps/invite-users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"inviteUsers":"team@acme.com","companyName":"x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["next"], "/completed");
        assert_eq!(json["completed"], true);
        assert_eq!(json["stored"], serde_json::json!({"inviteUsers": "team@acme.com"}));
    }

    #[tokio::test]
    async fn reads_do_not_open_sessions() {
        let config = WizardConfig::default();
        let state = WizardState::new(&config).unwrap();
        let sessions = state.sessions.clone();
        let app = wizard_routes(state);

        for uri in ["/onboarding/personas", "/api/onboarding/status", "/completed"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert!(response.headers().get(header::SET_COOKIE).is_none(), "{uri}");
        }

        let response = app
            .oneshot(
                Request::post("/onboarding/company-profile")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("companyName=Acme&website=https%3A%2F%2Facme.com"))
                    .unwrap(),
            )
            .await
            .unwrap();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        let id = cookie
            .split(';')
            .next()
            .and_then(|pair| pair.strip_prefix("onboarding_session="))
            .and_then(|value| uuid::Uuid::parse_str(value).ok())
            .unwrap();
        assert!(sessions.contains(SessionId(id)).await);
    }
}
