pub mod auth;
pub mod server;
pub mod types;

pub use auth::extract_credential;
pub use server::{create_router, start_server, AppState};
