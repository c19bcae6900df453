// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, classroom, quiz, response},
    state::AppState,
    utils::auth::auth_middleware,
};

/// Assembles the main application router.
///
/// * `/auth` is public: Google login, callback and logout.
/// * `/api` requires a live session. Role checks happen in the
///   `Teacher` / `Student` extractors of each handler.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/google", get(auth::google_login))
        .route("/google/callback", get(auth::google_callback))
        .route("/logout", get(auth::logout));

    let classroom_routes = Router::new()
        .route("/", post(classroom::create_classroom))
        .route("/teaching", get(classroom::list_teaching))
        .route("/enrolled", get(classroom::list_enrolled))
        .route("/{id}", delete(classroom::delete_classroom))
        .route(
            "/{id}/students",
            get(classroom::list_students).post(classroom::add_students),
        )
        .route("/{id}/students/{email}", delete(classroom::remove_student))
        .route(
            "/{id}/quizzes",
            get(quiz::list_quizzes).post(quiz::create_quiz),
        )
        .route("/{id}/my-quizzes", get(quiz::list_my_quizzes));

    let quiz_routes = Router::new()
        .route("/{id}", get(quiz::get_quiz).delete(quiz::delete_quiz))
        .route("/{id}/close", post(quiz::close_quiz))
        .route("/{id}/response", get(response::get_response))
        .route("/{id}/responses", get(response::responses_by_students))
        .route(
            "/{id}/answer",
            post(response::submit_answer).delete(response::unsubmit_answer),
        )
        .route(
            "/{id}/grade",
            post(response::submit_grade).delete(response::unsubmit_grade),
        );

    let api_routes = Router::new()
        .route("/me", get(auth::me))
        .route("/responses", get(response::responses_by_quizzes))
        .nest("/classrooms", classroom_routes)
        .nest("/quizzes", quiz_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes)
        .nest("/api", api_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
