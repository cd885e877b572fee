//! Domain types for flightdesk.
//!
//! The three managed tables and the handful of typed values that live in
//! them. Rows themselves are handled generically through
//! [`Record`](crate::record::Record) and [`RecordSet`](crate::record::RecordSet)
//! so that every CRUD operation works column by column on any table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A table managed by flightdesk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Licensed pilots.
    Pilots,
    /// Airports flights can depart from or arrive at.
    Destinations,
    /// Scheduled flights between two destinations.
    Flights,
}

impl Table {
    /// All tables in creation order. Flights reference the other two, so
    /// they come last.
    pub const ALL: [Table; 3] = [Self::Pilots, Self::Destinations, Self::Flights];

    /// The SQL name of the table.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Pilots => "pilots",
            Self::Destinations => "destinations",
            Self::Flights => "flights",
        }
    }

    /// Human-readable title used in menus.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Pilots => "Pilots",
            Self::Destinations => "Destinations",
            Self::Flights => "Flights",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pilots" => Ok(Self::Pilots),
            "destinations" => Ok(Self::Destinations),
            "flights" => Ok(Self::Flights),
            _ => Err(Error::UnknownTable(s.to_string())),
        }
    }
}

/// Operational status of a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    /// On the schedule, not yet boarding.
    Scheduled,
    /// Passengers are boarding.
    Boarding,
    /// Left the gate.
    Departed,
    /// Running late.
    Delayed,
    /// Landed at the destination.
    Arrived,
    /// Will not fly.
    Cancelled,
}

impl FlightStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [FlightStatus; 6] = [
        Self::Scheduled,
        Self::Boarding,
        Self::Departed,
        Self::Delayed,
        Self::Arrived,
        Self::Cancelled,
    ];

    /// The stored text form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Boarding => "boarding",
            Self::Departed => "departed",
            Self::Delayed => "delayed",
            Self::Arrived => "arrived",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                Error::invalid_value(
                    "status",
                    format!("'{s}' is not one of {}", allowed.join(", ")),
                )
            })
    }
}

/// A flight joined with its route and pilot, as shown on the flight board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightBoardEntry {
    /// Flight row id.
    pub id: i64,
    /// Public flight number.
    pub flight_number: String,
    /// Departure airport code.
    pub from_code: String,
    /// Departure city.
    pub from_city: String,
    /// Arrival airport code.
    pub to_code: String,
    /// Arrival city.
    pub to_city: String,
    /// Scheduled departure.
    pub departure_time: String,
    /// Scheduled arrival.
    pub arrival_time: String,
    /// Current status text.
    pub status: String,
    /// Pilot's full name, if one is assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pilot: Option<String>,
}
