//! Backend test support utilities
//!
//! Shared by the migration, db-infra and backend test suites: unified logging
//! initialization, throwaway SQLite databases and Problem Details assertions.

pub mod problem_details;
pub mod sqlite;
pub mod test_logging;
