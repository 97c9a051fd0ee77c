//! Data access, generic over any sea-orm connection.

pub mod tags;
pub mod user_settings;
pub mod users;
