pub mod auction;
pub mod injection;
pub mod movement;
pub mod telemetry_snapshot;
