//! Parsing of the `"<value> <unit>"` strings shown in the record table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Option<String>,
}

impl Quantity {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self { value, unit: Some(unit.into()) }
    }

    /// Parses `"172.5 cm"`; returns `None` for placeholder text such as
    /// "No height data available due to empty bundle".
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let value: f64 = parts.next()?.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        let unit = parts.next().map(str::to_string);
        Some(Self { value, unit })
    }

    pub fn unit_str(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }

    /// Height in inches; centimetres are converted, any other unit is
    /// taken as inches already.
    pub fn as_inches(&self) -> f64 {
        match self.unit_str() {
            "cm" => self.value / 2.54,
            _ => self.value,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} {}", self.value, unit),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Administrative sex as recorded on the FHIR Patient resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub fn is_female(self) -> bool {
        matches!(self, Sex::Female)
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" => Ok(Sex::Female),
            "male" => Ok(Sex::Male),
            other => Err(format!("Gender must be 'male' or 'female', got '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_and_unit() {
        let q = Quantity::parse("172.5 cm").unwrap();
        assert_eq!(q.value, 172.5);
        assert_eq!(q.unit_str(), "cm");
        assert!((q.as_inches() - 67.913).abs() < 1e-3);
    }

    #[test]
    fn test_parse_placeholder_text() {
        assert!(Quantity::parse("No height data available due to empty bundle").is_none());
        assert!(Quantity::parse("").is_none());
        assert!(Quantity::parse("NaN mg/dL").is_none());
    }

    #[test]
    fn test_parse_without_unit() {
        let q = Quantity::parse("55").unwrap();
        assert_eq!(q.unit, None);
        assert_eq!(q.to_string(), "55");
    }

    #[test]
    fn test_sex_parsing() {
        assert_eq!("Female".parse::<Sex>(), Ok(Sex::Female));
        assert_eq!("male".parse::<Sex>(), Ok(Sex::Male));
        assert!("unknown".parse::<Sex>().is_err());
    }
}
