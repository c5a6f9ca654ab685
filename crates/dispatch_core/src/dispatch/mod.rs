pub mod adaptive;
pub mod baseline;
pub mod combinatorial;
mod common;
pub mod policy;
pub mod sequential;
#[cfg(test)]
pub(crate) mod testutil;
pub mod types;

use serde::{Deserialize, Serialize};

pub use adaptive::AdaptivePolicy;
pub use baseline::BaselinePolicy;
pub use combinatorial::CombinatorialPolicy;
pub use policy::{DispatchPolicy, DispatchPolicyResource};
pub use sequential::SequentialPolicy;
pub use types::{Assignment, AuctionContext, Bundle, DriverView, OrderView};

/// Which dispatch strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Baseline,
    Sequential,
    Combinatorial,
    Adaptive,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Sequential => "sequential",
            Self::Combinatorial => "combinatorial",
            Self::Adaptive => "adaptive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" => Some(Self::Baseline),
            "sequential" => Some(Self::Sequential),
            "combinatorial" => Some(Self::Combinatorial),
            "adaptive" => Some(Self::Adaptive),
            _ => None,
        }
    }

    pub const ALL: [PolicyKind; 4] = [
        Self::Baseline,
        Self::Sequential,
        Self::Combinatorial,
        Self::Adaptive,
    ];
}

/// Construct a boxed policy from its kind.
pub fn build_policy(kind: PolicyKind) -> Box<dyn DispatchPolicy> {
    match kind {
        PolicyKind::Baseline => Box::new(BaselinePolicy),
        PolicyKind::Sequential => Box::new(SequentialPolicy),
        PolicyKind::Combinatorial => Box::new(CombinatorialPolicy),
        PolicyKind::Adaptive => Box::new(AdaptivePolicy::new()),
    }
}
