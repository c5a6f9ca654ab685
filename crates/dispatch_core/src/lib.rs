pub mod bundles;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod ecs;
pub mod error;
pub mod generator;
pub mod geo;
pub mod oracle;
pub mod route;
pub mod runner;
pub mod scenario;
pub mod scoring;
pub mod systems;
pub mod telemetry;
