use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::geo_utils::{distance_meters, GeoPoint};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    /// Stays where it was created until the user leaves it.
    Fixed,
    /// Follows the user on every update.
    Realtime,
}

/// A circular region around a point. Zones are replaced rather than moved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub center: GeoPoint,
    pub radius_meters: f64,
    pub kind: ZoneKind,
    pub name: Option<String>,
}

impl Zone {
    pub fn new(center: GeoPoint, radius_meters: f64, kind: ZoneKind) -> Self {
        Zone {
            id: Uuid::new_v4().to_string(),
            center,
            radius_meters,
            kind,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        distance_meters(&self.center, point) <= self.radius_meters
    }
}

#[cfg(test)]
mod tests {
    use super::ZoneKind;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn kind_string_conversion() {
        for kind in ZoneKind::iter() {
            assert_eq!(kind, ZoneKind::from_str(&kind.to_string()).unwrap());
        }
        assert_eq!(ZoneKind::Realtime.to_string(), "realtime");
    }
}
