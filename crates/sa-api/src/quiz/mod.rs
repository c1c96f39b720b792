//! Quizzes and timed quiz sessions.

mod registry;
pub mod routes;
pub mod service;
mod timer;

pub use registry::{LiveSession, SessionRegistry};
pub use routes::routes;
