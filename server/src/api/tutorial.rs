//! Tutorial pages: `GET /test/stepN` and `GET /test/stepN/summary`.

use crate::server::state::AppState;
use crate::services::tutorial::STEP_COUNT;
use axum::{Router, extract::State, routing::get};
use everydoc_web::{WebResult, reply};

/// Routes for every tutorial step.
pub fn routes() -> Router<AppState> {
    (1..=STEP_COUNT).fold(Router::new(), |router, step| {
        router
            .route(
                &format!("/test/step{step}"),
                get(move |state: State<AppState>| page(state, step)),
            )
            .route(
                &format!("/test/step{step}/summary"),
                get(move |state: State<AppState>| summary(state, step)),
            )
    })
}

async fn page(State(state): State<AppState>, step: u8) -> WebResult<String> {
    reply::text(state.tutorials.page(step)).await
}

async fn summary(State(state): State<AppState>, step: u8) -> WebResult<String> {
    reply::text(state.tutorials.summary(step)).await
}
