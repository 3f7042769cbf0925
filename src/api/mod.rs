mod handlers;
mod routes;
mod state;

pub use handlers::{HealthResponse, RecommendationResponse, ReloadResponse};
pub use routes::create_router;
pub use state::{AppState, AppStateInner};
