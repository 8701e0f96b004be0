//! GeoPt: a coordinate pair built from loosely-typed input.

use std::fmt;
use std::ops::Deref;

use simplendb_datastore::GeoPoint;

use crate::TypeError;

/// One coordinate as a caller might supply it.
#[derive(Clone, Debug, PartialEq)]
pub enum Coordinate {
    Float(f64),
    Integer(i64),
    Text(String),
}

impl Coordinate {
    /// Convert to a float.
    ///
    /// Text is trimmed and parsed. The empty string becomes `0.0`.
    fn to_float(&self) -> Result<f64, TypeError> {
        match self {
            Coordinate::Float(f) => Ok(*f),
            Coordinate::Integer(i) => Ok(*i as f64),
            Coordinate::Text(s) if s.is_empty() => Ok(0.0),
            Coordinate::Text(s) => s.trim().parse::<f64>().map_err(|e| TypeError::Coordinate {
                input: s.clone(),
                message: e.to_string(),
            }),
        }
    }
}

impl From<f64> for Coordinate {
    fn from(v: f64) -> Self {
        Coordinate::Float(v)
    }
}

impl From<f32> for Coordinate {
    fn from(v: f32) -> Self {
        Coordinate::Float(v as f64)
    }
}

impl From<i64> for Coordinate {
    fn from(v: i64) -> Self {
        Coordinate::Integer(v)
    }
}

impl From<i32> for Coordinate {
    fn from(v: i32) -> Self {
        Coordinate::Integer(v as i64)
    }
}

impl From<&str> for Coordinate {
    fn from(v: &str) -> Self {
        Coordinate::Text(v.to_string())
    }
}

impl From<String> for Coordinate {
    fn from(v: String) -> Self {
        Coordinate::Text(v)
    }
}

/// A latitude/longitude pair as stored by a GeoPtProperty.
///
/// ```rust
/// use simplendb::GeoPt;
///
/// assert_eq!(GeoPt::coerce(52, "1.5").unwrap(), GeoPt::new(52.0, 1.5));
/// assert_eq!(GeoPt::coerce("", "").unwrap(), GeoPt::new(0.0, 0.0));
/// assert!(GeoPt::coerce("north", 1.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPt(GeoPoint);

impl GeoPt {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPt(GeoPoint::new(latitude, longitude))
    }

    /// Build a point from floats, integers or numeric text.
    ///
    /// An empty string counts as `0.0`. Anything else that does not parse
    /// as a float is a [`TypeError::Coordinate`].
    pub fn coerce(
        latitude: impl Into<Coordinate>,
        longitude: impl Into<Coordinate>,
    ) -> Result<Self, TypeError> {
        let latitude = latitude.into().to_float()?;
        let longitude = longitude.into().to_float()?;
        Ok(GeoPt::new(latitude, longitude))
    }

    pub fn latitude(&self) -> f64 {
        self.0.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.0.longitude
    }

    pub fn into_inner(self) -> GeoPoint {
        self.0
    }
}

impl Deref for GeoPt {
    type Target = GeoPoint;

    fn deref(&self) -> &GeoPoint {
        &self.0
    }
}

impl From<GeoPoint> for GeoPt {
    fn from(point: GeoPoint) -> Self {
        GeoPt(point)
    }
}

impl From<GeoPt> for GeoPoint {
    fn from(point: GeoPt) -> Self {
        point.0
    }
}

impl fmt::Display for GeoPt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPt({}, {})", self.latitude(), self.longitude())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_pass_through() {
        let point = GeoPt::coerce(52.25, -1.5).unwrap();
        assert_eq!(point.latitude(), 52.25);
        assert_eq!(point.longitude(), -1.5);
    }

    #[test]
    fn integers_convert() {
        assert_eq!(GeoPt::coerce(52, 1).unwrap(), GeoPt::new(52.0, 1.0));
    }

    #[test]
    fn empty_strings_become_zero() {
        assert_eq!(GeoPt::coerce("", "").unwrap(), GeoPt::new(0.0, 0.0));
        assert_eq!(GeoPt::coerce("", 3.0).unwrap(), GeoPt::new(0.0, 3.0));
    }

    #[test]
    fn zero_stays_zero() {
        assert_eq!(GeoPt::coerce(0, 0.0).unwrap(), GeoPt::new(0.0, 0.0));
        assert_eq!(GeoPt::coerce("0", "0.0").unwrap(), GeoPt::new(0.0, 0.0));
    }

    #[test]
    fn numeric_text_parses() {
        assert_eq!(
            GeoPt::coerce(" 51.5 ", "-0.12").unwrap(),
            GeoPt::new(51.5, -0.12)
        );
        assert_eq!(GeoPt::coerce("1e1", "2").unwrap(), GeoPt::new(10.0, 2.0));
    }

    #[test]
    fn non_numeric_text_is_type_error() {
        let err = GeoPt::coerce("north", "east").unwrap_err();
        assert!(matches!(err, TypeError::Coordinate { ref input, .. } if input == "north"));
        assert!(GeoPt::coerce(1.0, "west").is_err());
        // Whitespace alone is not empty and does not parse.
        assert!(GeoPt::coerce("  ", 1.0).is_err());
    }

    #[test]
    fn converts_to_and_from_store_point() {
        let point = GeoPt::new(1.0, 2.0);
        let raw: GeoPoint = point.into();
        assert_eq!(GeoPt::from(raw), point);
        assert_eq!(point.latitude, 1.0);
    }
}
