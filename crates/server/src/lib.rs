use db::DBService;
use services::services::exchange::ExchangeRunner;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub exchanges: ExchangeRunner,
}

pub fn app(state: AppState) -> axum::Router {
    routes::router(&state)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
