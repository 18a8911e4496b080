// src/routes.rs

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{admin, auth, student},
    state::AppState,
    utils::session::{admin_middleware, session_middleware, student_middleware},
};

/// Assembles the main application router.
///
/// * Public routes: login, registration, logout.
/// * Admin and student routes, each behind the session check and a role gate.
/// * Credential submissions are rate limited per client IP, so the server
///   must be run with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_router(state: AppState) -> Router {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(state.config.auth_replenish_seconds.max(1))
        .burst_size(state.config.auth_burst.max(1))
        .finish()
        .expect("governor quota is non-zero");

    let governor = GovernorLayer::new(Arc::new(governor_conf));

    let public_routes = Router::new()
        .route("/", get(auth::session_status))
        .route(
            "/register",
            post(auth::register)
                .layer(governor.clone())
                .get(auth::register_page),
        )
        .route(
            "/login",
            post(auth::login)
                .layer(governor)
                .get(auth::session_status),
        )
        .route("/logout", get(auth::logout));

    let admin_routes = Router::new()
        .route("/admin_dashboard", get(admin::dashboard))
        .route(
            "/admin/add_exam",
            get(admin::add_exam_form).post(admin::add_exam),
        )
        .route(
            "/admin/set_mcqs/{exam_id}",
            get(admin::list_mcqs).post(admin::add_mcq),
        )
        .route(
            "/schedule_exam/{exam_id}",
            get(admin::schedule_form).post(admin::schedule_exam),
        )
        .route("/publish_results/{exam_id}", get(admin::publish_results))
        .route(
            "/view_queries",
            get(admin::view_queries).post(admin::respond_query),
        )
        // Session first, then the role check
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    let student_routes = Router::new()
        .route("/student_dashboard", get(student::dashboard))
        .route(
            "/take_exam/{exam_id}",
            get(student::exam_paper).post(student::submit_exam),
        )
        .route(
            "/register_exam/{exam_id}",
            get(student::register_exam_form).post(student::register_exam),
        )
        .route("/view_results/{exam_id}", get(student::view_results))
        .route(
            "/contact_admin",
            get(student::my_queries).post(student::contact_admin),
        )
        .route_layer(middleware::from_fn(student_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(student_routes)
        // Global Middleware (applied from outside in)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
