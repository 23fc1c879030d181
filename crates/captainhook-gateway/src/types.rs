use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Plain-text body for rejected callers. Says nothing about which gate failed.
pub const UNAUTHORIZED_BODY: &str = "Not authorized.\n";
