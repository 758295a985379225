use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::*;
use crate::error::{AppError, Result};

/// Descriptive attributes of a drone, validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneAttributes {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub cam_quality: Option<String>,
    pub flight_time: Option<String>,
    pub max_speed: Option<String>,
    pub dimensions: Option<String>,
    pub weight: Option<String>,
    /// Cost of production
    pub cost_of_prod: Option<Decimal>,
    pub series: String,
}

/// Drone payload as submitted by a client
///
/// Every field is optional here so that a missing required field is reported
/// as a validation error rather than a JSON decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DroneSubmission {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub cam_quality: Option<String>,
    pub flight_time: Option<String>,
    pub max_speed: Option<String>,
    pub dimensions: Option<String>,
    pub weight: Option<String>,
    pub cost_of_prod: Option<Decimal>,
    pub series: Option<String>,
}

impl DroneSubmission {
    /// Check that required fields are present, then validate the result
    pub fn into_attributes(self) -> Result<DroneAttributes> {
        let attributes = DroneAttributes {
            name: self.name.ok_or_else(|| missing("name"))?,
            description: self.description,
            price: self.price.ok_or_else(|| missing("price"))?,
            cam_quality: self.cam_quality,
            flight_time: self.flight_time,
            max_speed: self.max_speed,
            dimensions: self.dimensions,
            weight: self.weight,
            cost_of_prod: self.cost_of_prod,
            series: self.series.ok_or_else(|| missing("series"))?,
        };
        attributes.validate()?;
        Ok(attributes)
    }
}

fn missing(field: &str) -> AppError {
    AppError::Validation(format!("Field '{}' is required", field))
}

fn check_required(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("Field '{}' must not be blank", field)));
    }
    check_len(field, value, max_len)
}

fn check_len(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "Field '{}' must be at most {} characters",
            field, max_len
        )));
    }
    Ok(())
}

fn check_optional(field: &str, value: &Option<String>, max_len: usize) -> Result<()> {
    match value {
        Some(v) => check_len(field, v, max_len),
        None => Ok(()),
    }
}

/// NUMERIC(10, 2): non-negative, two fractional digits, eight integer digits
fn check_money(field: &str, value: &Decimal) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Validation(format!("Field '{}' must not be negative", field)));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(AppError::Validation(format!(
            "Field '{}' allows at most {} decimal places",
            field, MONEY_SCALE
        )));
    }
    let ceiling = Decimal::from(10i64.pow(MONEY_PRECISION - MONEY_SCALE));
    if value.abs() >= ceiling {
        return Err(AppError::Validation(format!(
            "Field '{}' is too large",
            field
        )));
    }
    Ok(())
}

impl DroneAttributes {
    pub fn validate(&self) -> Result<()> {
        check_required("name", &self.name, MAX_DRONE_NAME_LEN)?;
        check_required("series", &self.series, MAX_SERIES_LEN)?;
        check_optional("description", &self.description, MAX_DESCRIPTION_LEN)?;
        check_optional("cam_quality", &self.cam_quality, MAX_CAM_QUALITY_LEN)?;
        check_optional("flight_time", &self.flight_time, MAX_FLIGHT_TIME_LEN)?;
        check_optional("max_speed", &self.max_speed, MAX_SPEED_LEN)?;
        check_optional("dimensions", &self.dimensions, MAX_DIMENSIONS_LEN)?;
        check_optional("weight", &self.weight, MAX_WEIGHT_LEN)?;
        check_money("price", &self.price)?;
        if let Some(cost) = &self.cost_of_prod {
            check_money("cost_of_prod", cost)?;
        }
        Ok(())
    }

    /// Money fields rescaled to exactly two fractional digits
    ///
    /// Call after `validate`, which guarantees the rescale is exact.
    pub fn at_money_scale(mut self) -> Self {
        self.price.rescale(MONEY_SCALE);
        if let Some(cost) = self.cost_of_prod.as_mut() {
            cost.rescale(MONEY_SCALE);
        }
        self
    }
}

/// A drone record together with its owner
#[derive(Debug, Clone, PartialEq)]
pub struct Drone {
    /// URL-safe random id
    pub id: String,
    /// Id of the owning account
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub attributes: DroneAttributes,
}

/// Public projection of a drone: owner and timestamps stay internal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub cam_quality: Option<String>,
    pub flight_time: Option<String>,
    pub max_speed: Option<String>,
    pub dimensions: Option<String>,
    pub weight: Option<String>,
    pub cost_of_prod: Option<Decimal>,
    pub series: String,
}

impl Drone {
    pub fn to_public_view(&self) -> DroneView {
        let a = &self.attributes;
        DroneView {
            id: self.id.clone(),
            name: a.name.clone(),
            description: a.description.clone(),
            price: a.price,
            cam_quality: a.cam_quality.clone(),
            flight_time: a.flight_time.clone(),
            max_speed: a.max_speed.clone(),
            dimensions: a.dimensions.clone(),
            weight: a.weight.clone(),
            cost_of_prod: a.cost_of_prod,
            series: a.series.clone(),
        }
    }
}

/// Raw `drones` row; money columns are stored as decimal text
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DroneRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub cam_quality: Option<String>,
    pub flight_time: Option<String>,
    pub max_speed: Option<String>,
    pub dimensions: Option<String>,
    pub weight: Option<String>,
    pub cost_of_prod: Option<String>,
    pub series: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DroneRow> for Drone {
    type Error = AppError;

    fn try_from(row: DroneRow) -> Result<Self> {
        let price = Decimal::from_str(&row.price)?;
        let cost_of_prod = row
            .cost_of_prod
            .as_deref()
            .map(Decimal::from_str)
            .transpose()?;

        Ok(Drone {
            id: row.id,
            owner_id: row.owner_id,
            created_at: row.created_at,
            attributes: DroneAttributes {
                name: row.name,
                description: row.description,
                price,
                cam_quality: row.cam_quality,
                flight_time: row.flight_time,
                max_speed: row.max_speed,
                dimensions: row.dimensions,
                weight: row.weight,
                cost_of_prod,
                series: row.series,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> DroneSubmission {
        DroneSubmission {
            name: Some("Mavic Air".to_string()),
            description: Some("Foldable quadcopter".to_string()),
            price: Some(Decimal::from_str("899.99").unwrap()),
            cam_quality: Some("4K HDR".to_string()),
            flight_time: Some("34 min".to_string()),
            max_speed: Some("68 km/h".to_string()),
            dimensions: Some("183x253x77 mm".to_string()),
            weight: Some("570 g".to_string()),
            cost_of_prod: Some(Decimal::from_str("310.50").unwrap()),
            series: Some("Air".to_string()),
        }
    }

    fn assert_validation<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains(needle), "{msg}"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_submission() {
        let attributes = submission().into_attributes().unwrap();
        assert_eq!(attributes.name, "Mavic Air");
        assert_eq!(attributes.price, Decimal::from_str("899.99").unwrap());
    }

    #[test]
    fn test_missing_required_fields() {
        let mut s = submission();
        s.name = None;
        assert_validation(s.into_attributes(), "name");

        let mut s = submission();
        s.price = None;
        assert_validation(s.into_attributes(), "price");

        let mut s = submission();
        s.series = None;
        assert_validation(s.into_attributes(), "series");
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let s = DroneSubmission {
            name: Some("Tiny Whoop".to_string()),
            price: Some(Decimal::from(49)),
            series: Some("Micro".to_string()),
            ..Default::default()
        };
        let attributes = s.into_attributes().unwrap();
        assert!(attributes.description.is_none());
        assert!(attributes.cost_of_prod.is_none());
    }

    #[test]
    fn test_blank_required_field_rejected() {
        let mut s = submission();
        s.name = Some("   ".to_string());
        assert_validation(s.into_attributes(), "blank");
    }

    #[test]
    fn test_length_limits() {
        let mut s = submission();
        s.weight = Some("w".repeat(MAX_WEIGHT_LEN + 1));
        assert_validation(s.into_attributes(), "weight");

        let mut s = submission();
        s.description = Some("d".repeat(MAX_DESCRIPTION_LEN));
        assert!(s.into_attributes().is_ok());
    }

    #[test]
    fn test_money_rules() {
        let mut s = submission();
        s.price = Some(Decimal::from_str("-1.00").unwrap());
        assert_validation(s.into_attributes(), "negative");

        let mut s = submission();
        s.price = Some(Decimal::from_str("1.999").unwrap());
        assert_validation(s.into_attributes(), "decimal places");

        let mut s = submission();
        s.price = Some(Decimal::from_str("1.500").unwrap());
        assert!(s.into_attributes().is_ok());

        let mut s = submission();
        s.cost_of_prod = Some(Decimal::from_str("99999999.99").unwrap());
        assert!(s.into_attributes().is_ok());

        let mut s = submission();
        s.cost_of_prod = Some(Decimal::from_str("100000000").unwrap());
        assert_validation(s.into_attributes(), "too large");
    }

    #[test]
    fn test_money_rescaled_to_two_places() {
        let mut s = submission();
        s.price = Some(Decimal::from_str("1.500").unwrap());
        s.cost_of_prod = Some(Decimal::from(5));
        let attributes = s.into_attributes().unwrap().at_money_scale();

        assert_eq!(attributes.price.to_string(), "1.50");
        assert_eq!(attributes.cost_of_prod.unwrap().to_string(), "5.00");
    }

    #[test]
    fn test_public_view_fields() {
        let drone = Drone {
            id: "abc".to_string(),
            owner_id: "owner-1".to_string(),
            created_at: Utc::now(),
            attributes: submission().into_attributes().unwrap(),
        };
        let json = serde_json::to_value(drone.to_public_view()).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();

        assert_eq!(
            keys,
            vec![
                "cam_quality",
                "cost_of_prod",
                "description",
                "dimensions",
                "flight_time",
                "id",
                "max_speed",
                "name",
                "price",
                "series",
                "weight",
            ]
        );
        assert!(!json.to_string().contains("owner-1"));
    }

    #[test]
    fn test_row_conversion_parses_money() {
        let row = DroneRow {
            id: "abc".to_string(),
            name: "Mavic Air".to_string(),
            description: None,
            price: "899.99".to_string(),
            cam_quality: None,
            flight_time: None,
            max_speed: None,
            dimensions: None,
            weight: None,
            cost_of_prod: Some("310.5".to_string()),
            series: "Air".to_string(),
            owner_id: "owner-1".to_string(),
            created_at: Utc::now(),
        };
        let drone = Drone::try_from(row).unwrap();
        assert_eq!(drone.attributes.price, Decimal::from_str("899.99").unwrap());
        assert_eq!(drone.attributes.cost_of_prod, Some(Decimal::from_str("310.50").unwrap()));
    }

    #[test]
    fn test_row_conversion_rejects_garbage_money() {
        let row = DroneRow {
            id: "abc".to_string(),
            name: "x".to_string(),
            description: None,
            price: "not-a-number".to_string(),
            cam_quality: None,
            flight_time: None,
            max_speed: None,
            dimensions: None,
            weight: None,
            cost_of_prod: None,
            series: "s".to_string(),
            owner_id: "o".to_string(),
            created_at: Utc::now(),
        };
        assert!(matches!(Drone::try_from(row), Err(AppError::Decimal(_))));
    }
}
