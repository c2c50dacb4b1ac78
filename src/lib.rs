//! Back office de frota
//!
//! Cadastro de unidades, clientes, motoristas, cavalos, conjuntos e
//! agrupamentos, ciclo de vida de viagens (com wizard) e dashboard.

pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
