//! HTTP invocation surface for the resize pipeline.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

pub use setup::routes::setup_routes;
pub use state::AppState;
