use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Summary of one daily run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub weekday: String,
    pub solo_sent: usize,
    pub skippers_reset: usize,
    pub participants: usize,
    pub skipped_unconfigured: usize,
    pub pairs: usize,
    pub compatible_pairs: usize,
    pub leftover: Option<String>,
    pub failed_notifications: usize,
    /// Matching hit its time budget and delivered the best ordering found
    #[serde(default)]
    pub search_cancelled: bool,
}
