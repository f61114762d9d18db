use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::geo;

/// Distance in kilometers under which two same-named locations are the same place.
pub const OVERLAP_DISTANCE_KM: f64 = 10.0;

/// A named geographic point, typically a city.
///
/// Field names on the wire follow the OpenWeather geocoding API, which calls the
/// city `name`. Southern latitudes and western longitudes are negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "name")]
    pub city: String,

    /// Administrative subdivision, empty when the source has none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub state: String,

    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// Reads a string that the source may send as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Location {
    /// Builds a location from its parts; pass an empty `state` when there is none.
    pub fn new(
        city: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            country: country.into(),
            lat,
            lon,
        }
    }

    /// Estimated distance to `other` in kilometers.
    ///
    /// Uses the equirectangular approximation from [`geo::equirectangular_km`],
    /// which is only meant for the near-duplicate check in [`Location::overlaps`].
    pub fn distance_to(&self, other: &Location) -> f64 {
        geo::equirectangular_km(self.lat, self.lon, other.lat, other.lon)
    }

    /// `"City, State, Country"` when `include_state` is set and a state is known,
    /// `"City, Country"` otherwise.
    pub fn display_name(&self, include_state: bool) -> String {
        if include_state && !self.state.is_empty() {
            format!("{}, {}, {}", self.city, self.state, self.country)
        } else {
            format!("{}, {}", self.city, self.country)
        }
    }

    /// Two locations overlap when the city names match exactly and they are at
    /// most [`OVERLAP_DISTANCE_KM`] apart.
    ///
    /// State and country are not compared, so same-named places on either side
    /// of a border can collapse into one.
    pub fn overlaps(&self, other: &Location) -> bool {
        self.city == other.city && self.distance_to(other) <= OVERLAP_DISTANCE_KM
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name(true))
    }
}
