//! Domain entities shared by the ingestion and report sides

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cargo category discriminator; routes a record into the left (GC) or
/// right (CONTAINER) block of the production grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum CargoCategory {
    #[sqlx(rename = "GC")]
    Gc,
    #[sqlx(rename = "CONTAINER")]
    Container,
}

impl CargoCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            CargoCategory::Gc => "GC",
            CargoCategory::Container => "CONTAINER",
        }
    }

    /// Category of a cargo type, derived from its name
    pub fn from_cargo_name(name: &str) -> Self {
        if name.trim().to_uppercase().contains("CONTAINER") {
            CargoCategory::Container
        } else {
            CargoCategory::Gc
        }
    }

    /// Parse a filter value; "all", empty and unknown values mean no filter
    pub fn parse_filter(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "GC" => Some(CargoCategory::Gc),
            "CONTAINER" => Some(CargoCategory::Container),
            _ => None,
        }
    }
}

/// Shipping line category; `InterIsland` is the fallback for new lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum LineCategory {
    #[sqlx(rename = "OCEAN GOING")]
    OceanGoing,
    #[sqlx(rename = "INTER ISLAND")]
    InterIsland,
}

impl LineCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            LineCategory::OceanGoing => "OCEAN GOING",
            LineCategory::InterIsland => "INTER ISLAND",
        }
    }

    /// Category for a newly created line, inferred from its name
    pub fn from_line_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("OCEAN GOING") {
            LineCategory::OceanGoing
        } else {
            LineCategory::InterIsland
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub alpha3: String,
    pub flag_emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShippingLine {
    pub id: i64,
    pub name: String,
    pub category: LineCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CargoType {
    pub id: i64,
    pub name: String,
    pub category: CargoCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ship {
    pub id: i64,
    pub name: String,
    pub country_id: i64,
    pub shipping_line_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShipOperation {
    pub id: i64,
    pub user_id: i64,
    pub ship_id: i64,
    pub cargo_type_id: i64,
    pub operation_date: NaiveDate,
    pub unloading_tonnage: f64,
    pub loading_tonnage: f64,
    pub remarks: Option<String>,
}

impl ShipOperation {
    pub fn total_tonnage(&self) -> f64 {
        self.unloading_tonnage + self.loading_tonnage
    }
}

/// Joined read model used by the report side: one operation with its ship,
/// line, country and cargo names resolved.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OperationRow {
    pub ship_id: i64,
    pub ship_name: String,
    pub shipping_line: String,
    pub country: String,
    pub cargo_name: String,
    pub category: CargoCategory,
    pub unloading_tonnage: f64,
    pub loading_tonnage: f64,
    pub operation_date: NaiveDate,
}

impl OperationRow {
    pub fn total_tonnage(&self) -> f64 {
        self.unloading_tonnage + self.loading_tonnage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cargo_category_from_name() {
        assert_eq!(CargoCategory::from_cargo_name("STEEL"), CargoCategory::Gc);
        assert_eq!(
            CargoCategory::from_cargo_name("CONTAINER"),
            CargoCategory::Container
        );
        assert_eq!(
            CargoCategory::from_cargo_name("empty container"),
            CargoCategory::Container
        );
    }

    #[test]
    fn cargo_category_filter_parsing() {
        assert_eq!(CargoCategory::parse_filter("gc"), Some(CargoCategory::Gc));
        assert_eq!(
            CargoCategory::parse_filter("CONTAINER"),
            Some(CargoCategory::Container)
        );
        assert_eq!(CargoCategory::parse_filter("all"), None);
        assert_eq!(CargoCategory::parse_filter(""), None);
    }

    #[test]
    fn line_category_from_name() {
        assert_eq!(
            LineCategory::from_line_name("Ocean Going"),
            LineCategory::OceanGoing
        );
        assert_eq!(
            LineCategory::from_line_name("Meratus"),
            LineCategory::InterIsland
        );
    }
}
