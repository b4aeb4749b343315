//! Airport and place types for the flight data API.

use serde::{Deserialize, Serialize};

/// An airport as served to router clients.
///
/// Results are keyed by `code`; two remote entries with the same code
/// collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    /// IATA code (e.g. "HAV").
    pub code: String,
    /// Airport name.
    pub name: String,
    /// City served.
    pub city: Option<String>,
    /// ISO country code.
    pub country: Option<String>,
}

/// Wrapper shape for flight API list responses.
#[derive(Debug, Clone, Deserialize)]
pub struct DataResponse<T> {
    /// Response payload.
    pub data: Vec<T>,
}

/// Raw airport entry from `/air/airports`.
#[derive(Debug, Clone, Deserialize)]
pub struct AirportData {
    /// IATA code.
    pub iata_code: Option<String>,
    /// Airport name.
    pub name: Option<String>,
    /// City name.
    pub city_name: Option<String>,
    /// ISO country code.
    pub iata_country_code: Option<String>,
}

/// Raw place entry from `/places/suggestions`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceData {
    /// IATA code.
    pub iata_code: Option<String>,
    /// Place name.
    pub name: Option<String>,
    /// City name, present for airport-type places.
    pub city_name: Option<String>,
    /// ISO country code.
    pub iata_country_code: Option<String>,
    /// Place type ("airport" or "city").
    #[serde(rename = "type")]
    pub place_type: Option<String>,
}

impl AirportData {
    /// Convert to an [`Airport`], dropping entries without a code.
    pub fn into_airport(self) -> Option<Airport> {
        Some(Airport {
            code: self.iata_code?,
            name: self.name.unwrap_or_default(),
            city: self.city_name,
            country: self.iata_country_code,
        })
    }
}

impl PlaceData {
    /// Convert to an [`Airport`], dropping entries without a code.
    pub fn into_airport(self) -> Option<Airport> {
        Some(Airport {
            code: self.iata_code?,
            name: self.name.unwrap_or_default(),
            city: self.city_name,
            country: self.iata_country_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn airport_data_without_code_is_dropped() {
        let data = AirportData {
            iata_code: None,
            name: Some("Somewhere Field".to_string()),
            city_name: None,
            iata_country_code: None,
        };
        assert!(data.into_airport().is_none());
    }

    #[test]
    fn airport_data_converts() {
        let data = AirportData {
            iata_code: Some("HAV".to_string()),
            name: Some("Jose Marti International Airport".to_string()),
            city_name: Some("Havana".to_string()),
            iata_country_code: Some("CU".to_string()),
        };
        let airport = data.into_airport().unwrap();
        assert_eq!(airport.code, "HAV");
        assert_eq!(airport.city.as_deref(), Some("Havana"));
    }
}
