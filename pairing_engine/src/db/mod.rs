//! Database utilities for connections, pooling, and schema migrations.
//!
//! This module provides:
//! - SQLite connection helpers: [`connection::connect_sqlite`] applies WAL, foreign_keys=ON, and a 5000ms busy_timeout.
//! - Embedded Diesel migrations and runners: [`migrate::run_sqlite`] and [`migrate::run_all`]
//!   (accepts `sqlite:` URLs or bare paths).
//! - An r2d2 pool with the same PRAGMAs: [`pool::build_pool`].
//!
//! Example:
//! ```no_run
//! use pairing_engine::db::{migrate, connection};
//!
//! let db_path = std::env::temp_dir().join("pairing_example.db");
//! migrate::run_all(db_path.to_str().unwrap()).expect("migrations");
//!
//! let _conn = connection::connect_sqlite(db_path.to_str().unwrap()).expect("connect");
//! ```

pub mod connection;
pub mod migrate;
pub mod pool;
