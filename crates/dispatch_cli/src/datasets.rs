//! Named dataset registry: paired order/courier CSV files.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: &'static str,
    pub orders: &'static str,
    pub couriers: &'static str,
    pub description: &'static str,
}

impl Dataset {
    pub fn orders_path(&self) -> PathBuf {
        PathBuf::from(self.orders)
    }

    pub fn couriers_path(&self) -> PathBuf {
        PathBuf::from(self.couriers)
    }

    pub fn is_available(&self) -> bool {
        Path::new(self.orders).exists() && Path::new(self.couriers).exists()
    }
}

pub const DATASETS: &[Dataset] = &[
    Dataset {
        name: "demo",
        orders: "data/demo_orders.csv",
        couriers: "data/demo_couriers.csv",
        description: "10 orders, 4 couriers; ships with the repository",
    },
    Dataset {
        name: "clean_100",
        orders: "data/doha_orders_clean_100.csv",
        couriers: "data/doha_couriers_clean_100.csv",
        description: "100 orders, clean urban scenario",
    },
    Dataset {
        name: "hybrid_100",
        orders: "data/doha_orders_hybrid_100.csv",
        couriers: "data/doha_couriers_hybrid_100.csv",
        description: "100 orders, mixed urban/suburban",
    },
    Dataset {
        name: "stress",
        orders: "data/doha_orders_stress.csv",
        couriers: "data/doha_couriers_stress.csv",
        description: "High-volume stress scenario",
    },
];

pub fn find(name: &str) -> Option<&'static Dataset> {
    DATASETS.iter().find(|d| d.name == name)
}

pub fn print_listing() {
    println!("Available datasets:");
    for dataset in DATASETS {
        let status = if dataset.is_available() { "ok" } else { "missing" };
        println!(
            "  {:<12} [{status:^7}] {}",
            dataset.name, dataset.description
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_resolves_known_names_only() {
        assert!(find("demo").is_some());
        assert!(find("clean_100").is_some());
        assert!(find("nope").is_none());
    }
}
