//! Repositorios de acceso a datos
//!
//! Cada agregado expone un trait async. `Pg*` implementa sobre Postgres y
//! `MemoryStore` implementa todos los traits en memoria.

pub mod client_repository;
pub mod company_repository;
pub mod driver_repository;
pub mod grouping_repository;
pub mod memory;
pub mod semi_trailer_repository;
pub mod trip_repository;
pub mod unit_repository;
pub mod vehicle_repository;

use std::sync::Arc;

use sqlx::PgPool;

use client_repository::{ClientRepository, PgClientRepository};
use company_repository::{CompanyRepository, PgCompanyRepository};
use driver_repository::{DriverRepository, PgDriverRepository};
use grouping_repository::{GroupingRepository, PgGroupingRepository};
use memory::MemoryStore;
use semi_trailer_repository::{PgSemiTrailerRepository, SemiTrailerRepository};
use trip_repository::{PgTripRepository, TripRepository};
use unit_repository::{PgUnitRepository, UnitRepository};
use vehicle_repository::{PgTruckRepository, PgVehicleRepository, TruckRepository, VehicleRepository};

/// Conjunto de repositorios compartido por los controllers
#[derive(Clone)]
pub struct Repositories {
    pub companies: Arc<dyn CompanyRepository>,
    pub units: Arc<dyn UnitRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub drivers: Arc<dyn DriverRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub trucks: Arc<dyn TruckRepository>,
    pub semi_trailers: Arc<dyn SemiTrailerRepository>,
    pub groupings: Arc<dyn GroupingRepository>,
    pub trips: Arc<dyn TripRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            companies: Arc::new(PgCompanyRepository::new(pool.clone())),
            units: Arc::new(PgUnitRepository::new(pool.clone())),
            clients: Arc::new(PgClientRepository::new(pool.clone())),
            drivers: Arc::new(PgDriverRepository::new(pool.clone())),
            vehicles: Arc::new(PgVehicleRepository::new(pool.clone())),
            trucks: Arc::new(PgTruckRepository::new(pool.clone())),
            semi_trailers: Arc::new(PgSemiTrailerRepository::new(pool.clone())),
            groupings: Arc::new(PgGroupingRepository::new(pool.clone())),
            trips: Arc::new(PgTripRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            companies: store.clone(),
            units: store.clone(),
            clients: store.clone(),
            drivers: store.clone(),
            vehicles: store.clone(),
            trucks: store.clone(),
            semi_trailers: store.clone(),
            groupings: store.clone(),
            trips: store,
        }
    }
}
