// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Level, Participant, UserConfig, Profile, Pair, Pairing};
pub use requests::{UpdateConfigRequest, UpdateScheduleRequest};
pub use responses::{HealthResponse, ErrorResponse, RunReport};
