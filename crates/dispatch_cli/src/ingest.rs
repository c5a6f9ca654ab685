//! CSV ingestion for orders and couriers, with fail-fast schema validation.
//!
//! Input problems (missing column, unparseable coordinate, malformed
//! timestamp) surface before the simulation starts; nothing is recovered.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::Deserialize;

use dispatch_core::clock::SimMillis;
use dispatch_core::ecs::VehicleClass;
use dispatch_core::geo::Coordinate;
use dispatch_core::scenario::{DriverSpec, OrderSpec};

#[derive(Debug)]
pub enum IngestError {
    Io(std::io::Error),
    Csv(csv::Error),
    Schema { file: String, detail: String },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Io(err) => write!(f, "cannot read input: {err}"),
            IngestError::Csv(err) => write!(f, "malformed CSV: {err}"),
            IngestError::Schema { file, detail } => {
                write!(f, "invalid data in {file}: {detail}")
            }
        }
    }
}

impl std::error::Error for IngestError {}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Io(err)
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct OrderRecord {
    order_id: String,
    pickup_lat: f64,
    pickup_lng: f64,
    dropoff_lat: f64,
    dropoff_lng: f64,
    created_time: String,
    deadline: String,
    estimated_delivery_time_min: f64,
}

#[derive(Debug, Deserialize)]
struct CourierRecord {
    driver_id: String,
    start_lat: f64,
    start_lng: f64,
    vehicle_type: String,
    #[serde(default)]
    capacity: Option<usize>,
    available_from: String,
}

/// Default courier capacity when the column is empty.
const DEFAULT_CAPACITY: usize = 2;

/// Parse `HH:MM:SS`, accepting a full `YYYY-MM-DD HH:MM:SS` datetime too.
fn parse_clock(value: &str) -> Result<SimMillis, String> {
    let time = if value.contains(' ') {
        NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S")
            .map(|dt| dt.time())
            .map_err(|e| format!("malformed timestamp {value:?}: {e}"))?
    } else {
        NaiveTime::parse_from_str(value.trim(), "%H:%M:%S")
            .map_err(|e| format!("malformed timestamp {value:?}: {e}"))?
    };
    Ok(time.num_seconds_from_midnight() as SimMillis * 1_000)
}

fn checked_coordinate(lat: f64, lng: f64) -> Result<Coordinate, String> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("coordinate ({lat}, {lng}) out of range"));
    }
    Ok(Coordinate::new(lat, lng))
}

pub fn read_orders_from<R: Read>(reader: R, source: &str) -> Result<Vec<OrderSpec>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut orders = Vec::new();
    for record in csv_reader.deserialize() {
        let record: OrderRecord = record?;
        let schema = |detail: String| IngestError::Schema {
            file: source.to_string(),
            detail,
        };
        let pickup = checked_coordinate(record.pickup_lat, record.pickup_lng).map_err(schema)?;
        let dropoff = checked_coordinate(record.dropoff_lat, record.dropoff_lng).map_err(schema)?;
        let created_at = parse_clock(&record.created_time).map_err(schema)?;
        let deadline = parse_clock(&record.deadline).map_err(schema)?;
        if record.estimated_delivery_time_min <= 0.0 {
            return Err(schema(format!(
                "order {} has non-positive estimated delivery time",
                record.order_id
            )));
        }
        orders.push(OrderSpec {
            order_id: record.order_id,
            pickup,
            dropoff,
            created_at,
            deadline,
            estimated_mins: record.estimated_delivery_time_min,
        });
    }
    Ok(orders)
}

pub fn read_drivers_from<R: Read>(reader: R, source: &str) -> Result<Vec<DriverSpec>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut drivers = Vec::new();
    for record in csv_reader.deserialize() {
        let record: CourierRecord = record?;
        let schema = |detail: String| IngestError::Schema {
            file: source.to_string(),
            detail,
        };
        let start = checked_coordinate(record.start_lat, record.start_lng).map_err(schema)?;
        let vehicle = VehicleClass::parse(&record.vehicle_type).ok_or_else(|| {
            IngestError::Schema {
                file: source.to_string(),
                detail: format!(
                    "driver {} has unknown vehicle type {:?}",
                    record.driver_id, record.vehicle_type
                ),
            }
        })?;
        let available_from = parse_clock(&record.available_from).map_err(schema)?;
        drivers.push(DriverSpec {
            driver_id: record.driver_id,
            start,
            vehicle,
            capacity: record.capacity.unwrap_or(DEFAULT_CAPACITY).max(1),
            available_from,
        });
    }
    Ok(drivers)
}

pub fn load_orders(path: &Path) -> Result<Vec<OrderSpec>, IngestError> {
    let file = File::open(path)?;
    read_orders_from(file, &path.display().to_string())
}

pub fn load_drivers(path: &Path) -> Result<Vec<DriverSpec>, IngestError> {
    let file = File::open(path)?;
    read_drivers_from(file, &path.display().to_string())
}
