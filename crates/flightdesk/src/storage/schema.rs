//! `SQLite` schema definitions for flightdesk.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

use crate::model::Table;

/// SQL statement to create the pilots table.
pub const CREATE_PILOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS pilots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    license_number TEXT UNIQUE NOT NULL,
    flight_hours INTEGER NOT NULL CHECK (flight_hours >= 0)
)
";

/// SQL statement to create the destinations table.
pub const CREATE_DESTINATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS destinations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    city TEXT NOT NULL,
    country TEXT NOT NULL,
    airport_code TEXT UNIQUE NOT NULL
)
";

/// SQL statement to create the flights table.
pub const CREATE_FLIGHTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS flights (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    flight_number TEXT UNIQUE NOT NULL,
    source_id INTEGER NOT NULL,
    destination_id INTEGER NOT NULL,
    departure_time TEXT NOT NULL,
    arrival_time TEXT NOT NULL,
    status TEXT NOT NULL,
    pilot_id INTEGER,
    FOREIGN KEY (source_id) REFERENCES destinations(id),
    FOREIGN KEY (destination_id) REFERENCES destinations(id),
    FOREIGN KEY (pilot_id) REFERENCES pilots(id),
    CHECK (source_id <> destination_id),
    CHECK (arrival_time > departure_time)
)
";

/// SQL statement to index flights by departure airport.
pub const CREATE_FLIGHTS_SOURCE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_source ON flights(source_id)
";

/// SQL statement to index flights by arrival airport.
pub const CREATE_FLIGHTS_DESTINATION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_destination ON flights(destination_id)
";

/// SQL statement to index flights by pilot.
pub const CREATE_FLIGHTS_PILOT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_pilot ON flights(pilot_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Query backing the flight board.
pub const SELECT_FLIGHT_BOARD: &str = r"
SELECT f.id, f.flight_number,
       s.airport_code, s.city,
       d.airport_code, d.city,
       f.departure_time, f.arrival_time, f.status,
       p.first_name || ' ' || p.last_name
FROM flights f
JOIN destinations s ON s.id = f.source_id
JOIN destinations d ON d.id = f.destination_id
LEFT JOIN pilots p ON p.id = f.pilot_id
ORDER BY f.departure_time ASC, f.id ASC
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PILOTS_TABLE,
    CREATE_DESTINATIONS_TABLE,
    CREATE_FLIGHTS_TABLE,
    CREATE_FLIGHTS_SOURCE_INDEX,
    CREATE_FLIGHTS_DESTINATION_INDEX,
    CREATE_FLIGHTS_PILOT_INDEX,
    CREATE_METADATA_TABLE,
];

/// The DDL for a single table, including its indexes.
#[must_use]
pub fn table_ddl(table: Table) -> &'static [&'static str] {
    match table {
        Table::Pilots => &[CREATE_PILOTS_TABLE],
        Table::Destinations => &[CREATE_DESTINATIONS_TABLE],
        Table::Flights => &[
            CREATE_FLIGHTS_TABLE,
            CREATE_FLIGHTS_SOURCE_INDEX,
            CREATE_FLIGHTS_DESTINATION_INDEX,
            CREATE_FLIGHTS_PILOT_INDEX,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_pilots_table_contains_required_columns() {
        assert!(CREATE_PILOTS_TABLE.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(CREATE_PILOTS_TABLE.contains("license_number TEXT UNIQUE NOT NULL"));
        assert!(CREATE_PILOTS_TABLE.contains("CHECK (flight_hours >= 0)"));
    }

    #[test]
    fn test_flights_table_references_parents() {
        assert!(CREATE_FLIGHTS_TABLE.contains("REFERENCES destinations(id)"));
        assert!(CREATE_FLIGHTS_TABLE.contains("REFERENCES pilots(id)"));
        assert!(CREATE_FLIGHTS_TABLE.contains("pilot_id INTEGER,"));
    }

    #[test]
    fn test_table_ddl_covers_every_table() {
        for table in Table::ALL {
            let ddl = table_ddl(table);
            assert!(ddl[0].contains(&format!("CREATE TABLE IF NOT EXISTS {}", table.name())));
        }
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
