use crate::error::ApiError;
use std::fmt;
use std::str::FromStr;

/// Backend resource types managed from the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Aircraft,
    Flight,
    Passenger,
    Reservation,
    Maintenance,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Aircraft,
        ResourceKind::Flight,
        ResourceKind::Passenger,
        ResourceKind::Reservation,
        ResourceKind::Maintenance,
    ];

    /// REST collection path, without trailing slash.
    pub fn collection_path(&self) -> &'static str {
        match self {
            ResourceKind::Aircraft => "/aircrafts/aircrafts",
            ResourceKind::Flight => "/flights/flights",
            ResourceKind::Passenger => "/passengers/passengers",
            ResourceKind::Reservation => "/reservations/reservations",
            ResourceKind::Maintenance => "/maintenance/maintenance",
        }
    }

    /// Console location guarded by the route guard.
    pub fn location(&self) -> &'static str {
        match self {
            ResourceKind::Aircraft => "/avions",
            ResourceKind::Flight => "/vols",
            ResourceKind::Passenger => "/passagers",
            ResourceKind::Reservation => "/reservations",
            ResourceKind::Maintenance => "/maintenance",
        }
    }

    pub fn id_field(&self) -> &'static str {
        match self {
            ResourceKind::Aircraft => "avion_id",
            ResourceKind::Flight => "vol_num",
            ResourceKind::Passenger => "passenger_id",
            ResourceKind::Reservation => "reservation_id",
            ResourceKind::Maintenance => "maintenance_id",
        }
    }

    /// Field used for the default statistics breakdown.
    pub fn default_stat_field(&self) -> &'static str {
        match self {
            ResourceKind::Passenger => "nationality",
            _ => "state",
        }
    }

    /// Whether the API exposes a lookup by passport number for this resource.
    pub fn supports_passport_lookup(&self) -> bool {
        matches!(self, ResourceKind::Passenger | ResourceKind::Reservation)
    }

    pub fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Aircraft => "aircraft",
            ResourceKind::Flight => "flight",
            ResourceKind::Passenger => "passenger",
            ResourceKind::Reservation => "reservation",
            ResourceKind::Maintenance => "maintenance record",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Aircraft => "aircraft",
            ResourceKind::Flight => "flights",
            ResourceKind::Passenger => "passengers",
            ResourceKind::Reservation => "reservations",
            ResourceKind::Maintenance => "maintenance records",
        }
    }

    /// Map a classified error to a sentence in this resource's vocabulary.
    pub fn describe_error(&self, err: &ApiError) -> String {
        match err {
            ApiError::NotFound { .. } => format!("This {} does not exist", self.singular()),
            ApiError::AuthorizationDenied { .. } => {
                format!("You are not allowed to manage {}", self.plural())
            }
            ApiError::ValidationRejected { .. } => match err.detail() {
                Some(detail) => format!("Invalid {} data: {}", self.singular(), detail),
                None => format!("Invalid {} data", self.singular()),
            },
            ApiError::NetworkUnavailable(_) => {
                format!("Unable to load {}: server unreachable", self.plural())
            }
            _ => match err.detail() {
                Some(detail) => format!("Error: {}", detail),
                None => err.user_message(),
            },
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aircraft" | "aircrafts" | "avion" | "avions" => Ok(ResourceKind::Aircraft),
            "flight" | "flights" | "vol" | "vols" => Ok(ResourceKind::Flight),
            "passenger" | "passengers" | "passager" | "passagers" => Ok(ResourceKind::Passenger),
            "reservation" | "reservations" => Ok(ResourceKind::Reservation),
            "maintenance" | "maintenances" => Ok(ResourceKind::Maintenance),
            other => Err(format!(
                "unknown resource '{}' (expected aircraft, flights, passengers, reservations or maintenance)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("vols".parse::<ResourceKind>().unwrap(), ResourceKind::Flight);
        assert_eq!("Aircraft".parse::<ResourceKind>().unwrap(), ResourceKind::Aircraft);
        assert_eq!(
            "passagers".parse::<ResourceKind>().unwrap(),
            ResourceKind::Passenger
        );
        assert!("hangar".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_describe_error_uses_resource_vocabulary() {
        let msg = ResourceKind::Flight.describe_error(&ApiError::NotFound { detail: None });
        assert_eq!(msg, "This flight does not exist");

        let msg = ResourceKind::Aircraft
            .describe_error(&ApiError::ServerFault { status: 500, detail: Some("ORA-20001".into()) });
        assert_eq!(msg, "Error: ORA-20001");
    }
}
