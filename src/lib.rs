//! Onboarding wizard: multi-step company onboarding served over HTTP.

pub mod config;
pub mod error;
pub mod onboarding;
pub mod server;
