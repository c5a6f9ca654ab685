use serde::{Deserialize, Serialize};

use crate::clock::SimMillis;
use crate::config::DispatchConfig;
use crate::dispatch::PolicyKind;
use crate::ecs::VehicleClass;
use crate::geo::Coordinate;
use crate::oracle::OracleKind;

/// Input description of one order, before entities exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSpec {
    pub order_id: String,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub created_at: SimMillis,
    pub deadline: SimMillis,
    pub estimated_mins: f64,
}

/// Input description of one driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverSpec {
    pub driver_id: String,
    pub start: Coordinate,
    pub vehicle: VehicleClass,
    pub capacity: usize,
    pub available_from: SimMillis,
}

/// Parameters for building a simulation world.
#[derive(Debug, Clone, Default)]
pub struct ScenarioParams {
    pub policy: PolicyKind,
    pub oracle: OracleKind,
    pub config: DispatchConfig,
}

impl ScenarioParams {
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_oracle(mut self, oracle: OracleKind) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }
}
