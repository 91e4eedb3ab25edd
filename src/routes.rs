// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, leaderboard, profile, questions, results, stats},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, questions, results, user, stats, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let question_routes = Router::new().route("/", get(questions::get_questions));

    let subject_routes = Router::new().route("/", get(questions::list_subjects));

    let result_routes = Router::new()
        .route(
            "/",
            post(results::submit_result).get(results::list_my_results),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let user_routes = Router::new()
        .route("/me", get(profile::get_me))
        .route("/profile", put(profile::update_profile))
        .route("/dashboard-stats", get(stats::dashboard_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let stats_routes = Router::new()
        .route("/skills", get(stats::skills))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let leaderboard_routes = Router::new().route("/", get(leaderboard::get_leaderboard));

    let admin_routes = Router::new()
        .route("/questions/import", post(admin::import_questions))
        .route("/questions/{id}", delete(admin::delete_question))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/questions", question_routes)
        .nest("/api/subjects", subject_routes)
        .nest("/api/results", result_routes)
        .nest("/api/user", user_routes)
        .nest("/api/stats", stats_routes)
        .nest("/api/leaderboard", leaderboard_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
