//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean
//! al schema PostgreSQL (ver `migrations/`).

pub mod client;
pub mod company;
pub mod driver;
pub mod grouping;
pub mod trip;
pub mod unit;
pub mod vehicle;
