//! Store en memoria
//!
//! Implementa todos los repositorios sobre un único `RwLock`. Se usa en los
//! tests y para levantar la API sin Postgres (`STORAGE=memory`). Replica las
//! restricciones de la base: unicidad, foreign keys al excluir y los
//! `ON DELETE` del esquema.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::client_repository::{ClientRepository, CLIENT_NOT_FOUND_MESSAGE, DUPLICATE_CLIENT_MESSAGE};
use super::company_repository::{
    CompanyRepository, COMPANY_NOT_FOUND_MESSAGE, DUPLICATE_DOCUMENT_MESSAGE,
};
use super::driver_repository::{
    DriverRepository, DRIVER_NOT_FOUND_MESSAGE, DUPLICATE_CNH_MESSAGE,
    DUPLICATE_DRIVER_DOCUMENT_MESSAGE,
};
use super::grouping_repository::{GroupingRepository, GROUPING_NOT_FOUND_MESSAGE};
use super::semi_trailer_repository::{SemiTrailerRepository, SEMI_TRAILER_NOT_FOUND_MESSAGE};
use super::trip_repository::{InProgressTrip, TripRepository, TRIP_NOT_FOUND_MESSAGE};
use super::unit_repository::{
    UnitRepository, DUPLICATE_IDENTIFIER_MESSAGE, DUPLICATE_UNIT_MESSAGE, UNIT_NOT_FOUND_MESSAGE,
};
use super::vehicle_repository::{
    TruckRepository, VehicleRepository, DUPLICATE_PLATE_MESSAGE, TRUCK_NOT_FOUND_MESSAGE,
};
use crate::dto::company_dto::{CompanyInput, CompanyPatch};
use crate::dto::dashboard_dto::DashboardCounts;
use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::dto::grouping_dto::GroupingRequest;
use crate::dto::trip_dto::TripFilters;
use crate::dto::vehicle_dto::{
    CreateSemiTrailerRequest, CreateTruckRequest, UpdateSemiTrailerRequest, UpdateTruckRequest,
    VehicleInput, VehiclePatch,
};
use crate::models::client::Client;
use crate::models::company::{Address, Company};
use crate::models::driver::{Driver, Person};
use crate::models::grouping::Grouping;
use crate::models::trip::{Trip, TripFields};
use crate::models::unit::Unit;
use crate::models::vehicle::{Cargo, SemiTrailer, Trailer, TrailerConfiguration, Truck, Vehicle};
use crate::services::dashboard_service::tally_counts;
use crate::utils::errors::{conflict_error, not_found_error, AppResult, IN_USE_MESSAGE};

#[derive(Debug, Clone)]
struct UnitRecord {
    identifier: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct DriverRecord {
    cnh: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct TruckRecord {
    vehicle_id: i32,
    compressor: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct TrailerRecord {
    semi_trailer_id: i32,
    vehicle_id: i32,
    fleet_number: Option<String>,
}

#[derive(Debug, Clone)]
struct SemiTrailerRecord {
    kind: Option<String>,
    configuration: TrailerConfiguration,
    cargo_ids: Vec<i32>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryData {
    next_id: i32,
    companies: BTreeMap<i32, Company>,
    units: BTreeMap<i32, UnitRecord>,
    clients: BTreeMap<i32, DateTime<Utc>>,
    people: BTreeMap<i32, Person>,
    drivers: BTreeMap<i32, DriverRecord>,
    vehicles: BTreeMap<i32, Vehicle>,
    trucks: BTreeMap<i32, TruckRecord>,
    trailers: BTreeMap<i32, TrailerRecord>,
    semi_trailers: BTreeMap<i32, SemiTrailerRecord>,
    cargos: BTreeMap<i32, String>,
    groupings: BTreeMap<i32, Grouping>,
    trips: HashMap<Uuid, Trip>,
}

impl MemoryData {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn upsert_company(&mut self, input: &CompanyInput) -> i32 {
        if let Some(existing) = self.companies.values().find(|c| c.document == input.document) {
            return existing.id;
        }

        let id = self.next_id();
        let now = Utc::now();
        self.companies.insert(
            id,
            Company {
                id,
                name: input.name.clone(),
                trade_name: input.trade_name.clone(),
                document: input.document.clone(),
                document_type: input.document_type,
                address: input.address.clone().map(Address::from),
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    fn unit(&self, company_id: i32) -> Option<Unit> {
        let record = self.units.get(&company_id)?;
        Some(Unit {
            company_id,
            identifier: record.identifier.clone(),
            company: self.companies.get(&company_id)?.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    fn client(&self, company_id: i32) -> Option<Client> {
        let created_at = *self.clients.get(&company_id)?;
        Some(Client {
            company_id,
            company: self.companies.get(&company_id)?.clone(),
            created_at,
        })
    }

    fn driver(&self, person_id: i32) -> Option<Driver> {
        let record = self.drivers.get(&person_id)?;
        Some(Driver {
            person_id,
            cnh: record.cnh.clone(),
            person: self.people.get(&person_id)?.clone(),
            created_at: record.created_at,
        })
    }

    fn truck(&self, id: i32) -> Option<Truck> {
        let record = self.trucks.get(&id)?;
        Some(Truck {
            id,
            compressor: record.compressor,
            vehicle: self.vehicles.get(&record.vehicle_id)?.clone(),
            created_at: record.created_at,
        })
    }

    fn semi_trailer(&self, id: i32) -> Option<SemiTrailer> {
        let record = self.semi_trailers.get(&id)?;
        let trailers = self
            .trailers
            .iter()
            .filter(|(_, t)| t.semi_trailer_id == id)
            .filter_map(|(trailer_id, t)| {
                Some(Trailer {
                    id: *trailer_id,
                    fleet_number: t.fleet_number.clone(),
                    vehicle: self.vehicles.get(&t.vehicle_id)?.clone(),
                })
            })
            .collect();
        let cargos = record
            .cargo_ids
            .iter()
            .filter_map(|cargo_id| {
                Some(Cargo {
                    id: *cargo_id,
                    name: self.cargos.get(cargo_id)?.clone(),
                })
            })
            .collect();

        Some(SemiTrailer {
            id,
            kind: record.kind.clone(),
            configuration: record.configuration.clone(),
            cargos,
            trailers,
            created_at: record.created_at,
        })
    }

    fn plate_taken(&self, license_plate: &str, excluding: Option<i32>) -> bool {
        self.vehicles
            .values()
            .any(|v| v.license_plate == license_plate && Some(v.id) != excluding)
    }

    fn insert_vehicle(&mut self, input: &VehicleInput) -> AppResult<i32> {
        if self.plate_taken(&input.license_plate, None) {
            return Err(conflict_error(DUPLICATE_PLATE_MESSAGE));
        }

        let id = self.next_id();
        self.vehicles.insert(
            id,
            Vehicle {
                id,
                license_plate: input.license_plate.clone(),
                brand: input.brand.clone(),
                model: input.model.clone(),
                year: input.year.clone(),
                renavam: input.renavam.clone(),
                axle: input.axle,
                unit_id: input.unit_id,
            },
        );
        Ok(id)
    }

    fn patch_vehicle(&mut self, vehicle_id: i32, patch: &VehiclePatch) -> AppResult<()> {
        if let Some(plate) = &patch.license_plate {
            if self.plate_taken(plate, Some(vehicle_id)) {
                return Err(conflict_error(DUPLICATE_PLATE_MESSAGE));
            }
        }

        let vehicle = self
            .vehicles
            .get_mut(&vehicle_id)
            .ok_or_else(|| not_found_error(TRUCK_NOT_FOUND_MESSAGE))?;
        if let Some(plate) = &patch.license_plate {
            vehicle.license_plate = plate.clone();
        }
        if patch.brand.is_some() {
            vehicle.brand = patch.brand.clone();
        }
        if patch.model.is_some() {
            vehicle.model = patch.model.clone();
        }
        if patch.year.is_some() {
            vehicle.year = patch.year.clone();
        }
        if patch.renavam.is_some() {
            vehicle.renavam = patch.renavam.clone();
        }
        if patch.axle.is_some() {
            vehicle.axle = patch.axle;
        }
        if patch.unit_id.is_some() {
            vehicle.unit_id = patch.unit_id;
        }
        Ok(())
    }

    fn cargo_ids(&mut self, names: &[String]) -> Vec<i32> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let existing = self
                .cargos
                .iter()
                .find(|(_, cargo)| *cargo == name)
                .map(|(id, _)| *id);
            let id = match existing {
                Some(id) => id,
                None => {
                    let id = self.next_id();
                    self.cargos.insert(id, name.clone());
                    id
                }
            };
            ids.push(id);
        }
        ids
    }

    /// `ON DELETE SET NULL` de people.unit_id y vehicles.unit_id
    fn clear_unit_references(&mut self, unit_id: i32) {
        for person in self.people.values_mut() {
            if person.unit_id == Some(unit_id) {
                person.unit_id = None;
            }
        }
        for vehicle in self.vehicles.values_mut() {
            if vehicle.unit_id == Some(unit_id) {
                vehicle.unit_id = None;
            }
        }
    }

    fn in_use_by_trips(&self, predicate: impl Fn(&Trip) -> bool) -> bool {
        self.trips.values().any(predicate)
    }

    fn in_use_by_groupings(&self, predicate: impl Fn(&Grouping) -> bool) -> bool {
        self.groupings.values().any(predicate)
    }

    fn endpoint(&self, company_id: Option<i32>) -> (Option<String>, Option<String>, Option<String>) {
        match company_id.and_then(|id| self.companies.get(&id)) {
            Some(company) => (
                Some(company.display_name().to_string()),
                company.city().map(str::to_string),
                company.state().map(str::to_string),
            ),
            None => (None, None, None),
        }
    }
}

/// Store en memoria compartido por todos los repositorios
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn upsert_by_document(&self, input: &CompanyInput) -> AppResult<Company> {
        let mut data = self.data.write().await;
        let id = data.upsert_company(input);
        data.companies
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found_error(COMPANY_NOT_FOUND_MESSAGE))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Company>> {
        Ok(self.data.read().await.companies.get(&id).cloned())
    }

    async fn document_taken(&self, document: &str, excluding: Option<i32>) -> AppResult<bool> {
        let data = self.data.read().await;
        Ok(data
            .companies
            .values()
            .any(|c| c.document == document && Some(c.id) != excluding))
    }

    async fn update(&self, id: i32, patch: &CompanyPatch) -> AppResult<Company> {
        let mut data = self.data.write().await;

        if let Some(document) = &patch.document {
            if data.companies.values().any(|c| &c.document == document && c.id != id) {
                return Err(conflict_error(DUPLICATE_DOCUMENT_MESSAGE));
            }
        }

        let company = data
            .companies
            .get_mut(&id)
            .ok_or_else(|| not_found_error(COMPANY_NOT_FOUND_MESSAGE))?;
        if let Some(name) = &patch.name {
            company.name = name.clone();
        }
        if let Some(trade_name) = &patch.trade_name {
            company.trade_name = Some(trade_name.clone()).filter(|t| !t.is_empty());
        }
        if let Some(document) = &patch.document {
            company.document = document.clone();
        }
        if let Some(document_type) = patch.document_type {
            company.document_type = document_type;
        }
        if let Some(address) = &patch.address {
            company.address = Some(Address::from(address.clone()));
        }
        company.updated_at = Utc::now();

        Ok(company.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut data = self.data.write().await;

        if !data.companies.contains_key(&id) {
            return Err(not_found_error(COMPANY_NOT_FOUND_MESSAGE));
        }
        if data.clients.contains_key(&id) && data.in_use_by_trips(|t| t.references_client(id)) {
            return Err(conflict_error(IN_USE_MESSAGE));
        }

        data.companies.remove(&id);
        data.clients.remove(&id);
        if data.units.remove(&id).is_some() {
            data.clear_unit_references(id);
        }
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<Company>> {
        let data = self.data.read().await;
        let mut companies: Vec<Company> = data.companies.values().cloned().collect();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }
}

#[async_trait]
impl UnitRepository for MemoryStore {
    async fn identifier_taken(&self, identifier: &str, excluding: Option<i32>) -> AppResult<bool> {
        let data = self.data.read().await;
        Ok(data.units.iter().any(|(company_id, unit)| {
            unit.identifier.as_deref() == Some(identifier) && Some(*company_id) != excluding
        }))
    }

    async fn create_with_company(
        &self,
        identifier: Option<&str>,
        company: &CompanyInput,
    ) -> AppResult<Unit> {
        let mut data = self.data.write().await;

        if let Some(identifier) = identifier {
            if data.units.values().any(|u| u.identifier.as_deref() == Some(identifier)) {
                return Err(conflict_error(DUPLICATE_IDENTIFIER_MESSAGE));
            }
        }

        let company_id = data.upsert_company(company);
        if data.units.contains_key(&company_id) {
            return Err(conflict_error(DUPLICATE_UNIT_MESSAGE));
        }

        let now = Utc::now();
        data.units.insert(
            company_id,
            UnitRecord {
                identifier: identifier.map(str::to_string),
                created_at: now,
                updated_at: now,
            },
        );

        data.unit(company_id)
            .ok_or_else(|| not_found_error(UNIT_NOT_FOUND_MESSAGE))
    }

    async fn find_by_company_id(&self, company_id: i32) -> AppResult<Option<Unit>> {
        Ok(self.data.read().await.unit(company_id))
    }

    async fn list_all(&self) -> AppResult<Vec<Unit>> {
        let data = self.data.read().await;
        let mut units: Vec<Unit> = data.units.keys().filter_map(|id| data.unit(*id)).collect();
        units.sort_by(|a, b| a.company.name.cmp(&b.company.name));
        Ok(units)
    }

    async fn set_identifier(&self, company_id: i32, identifier: Option<&str>) -> AppResult<Unit> {
        let mut data = self.data.write().await;

        if let Some(identifier) = identifier {
            let taken = data.units.iter().any(|(id, u)| {
                u.identifier.as_deref() == Some(identifier) && *id != company_id
            });
            if taken {
                return Err(conflict_error(DUPLICATE_IDENTIFIER_MESSAGE));
            }
        }

        let unit = data
            .units
            .get_mut(&company_id)
            .ok_or_else(|| not_found_error(UNIT_NOT_FOUND_MESSAGE))?;
        unit.identifier = identifier.map(str::to_string);
        unit.updated_at = Utc::now();

        data.unit(company_id)
            .ok_or_else(|| not_found_error(UNIT_NOT_FOUND_MESSAGE))
    }

    async fn delete(&self, company_id: i32) -> AppResult<()> {
        let mut data = self.data.write().await;
        if data.units.remove(&company_id).is_none() {
            return Err(not_found_error(UNIT_NOT_FOUND_MESSAGE));
        }
        data.clear_unit_references(company_id);
        Ok(())
    }
}

#[async_trait]
impl ClientRepository for MemoryStore {
    async fn create_with_company(&self, company: &CompanyInput) -> AppResult<Client> {
        let mut data = self.data.write().await;

        let company_id = data.upsert_company(company);
        if data.clients.contains_key(&company_id) {
            return Err(conflict_error(DUPLICATE_CLIENT_MESSAGE));
        }
        data.clients.insert(company_id, Utc::now());

        data.client(company_id)
            .ok_or_else(|| not_found_error(CLIENT_NOT_FOUND_MESSAGE))
    }

    async fn find_by_company_id(&self, company_id: i32) -> AppResult<Option<Client>> {
        Ok(self.data.read().await.client(company_id))
    }

    async fn list_all(&self) -> AppResult<Vec<Client>> {
        let data = self.data.read().await;
        let mut clients: Vec<Client> =
            data.clients.keys().filter_map(|id| data.client(*id)).collect();
        clients.sort_by(|a, b| a.company.name.cmp(&b.company.name));
        Ok(clients)
    }

    async fn delete(&self, company_id: i32) -> AppResult<()> {
        let mut data = self.data.write().await;
        if !data.clients.contains_key(&company_id) {
            return Err(not_found_error(CLIENT_NOT_FOUND_MESSAGE));
        }
        if data.in_use_by_trips(|t| t.references_client(company_id)) {
            return Err(conflict_error(IN_USE_MESSAGE));
        }
        data.clients.remove(&company_id);
        Ok(())
    }
}

#[async_trait]
impl DriverRepository for MemoryStore {
    async fn document_taken(&self, document: &str, excluding: Option<i32>) -> AppResult<bool> {
        let data = self.data.read().await;
        Ok(data
            .people
            .values()
            .any(|p| p.document == document && Some(p.id) != excluding))
    }

    async fn cnh_taken(&self, cnh: &str, excluding: Option<i32>) -> AppResult<bool> {
        let data = self.data.read().await;
        Ok(data
            .drivers
            .iter()
            .any(|(id, d)| d.cnh == cnh && Some(*id) != excluding))
    }

    async fn create(&self, request: &CreateDriverRequest) -> AppResult<Driver> {
        let mut data = self.data.write().await;
        let person = &request.person;

        if data.people.values().any(|p| p.document == person.document) {
            return Err(conflict_error(DUPLICATE_DRIVER_DOCUMENT_MESSAGE));
        }
        if data.drivers.values().any(|d| d.cnh == request.cnh) {
            return Err(conflict_error(DUPLICATE_CNH_MESSAGE));
        }

        let id = data.next_id();
        data.people.insert(
            id,
            Person {
                id,
                name: person.name.clone(),
                nickname: person.nickname.clone(),
                document: person.document.clone(),
                phone_number: person.phone_number.clone(),
                unit_id: person.unit_id,
            },
        );
        data.drivers.insert(
            id,
            DriverRecord {
                cnh: request.cnh.clone(),
                created_at: Utc::now(),
            },
        );

        data.driver(id)
            .ok_or_else(|| not_found_error(DRIVER_NOT_FOUND_MESSAGE))
    }

    async fn find_by_id(&self, person_id: i32) -> AppResult<Option<Driver>> {
        Ok(self.data.read().await.driver(person_id))
    }

    async fn list_all(&self) -> AppResult<Vec<Driver>> {
        let data = self.data.read().await;
        let mut drivers: Vec<Driver> =
            data.drivers.keys().filter_map(|id| data.driver(*id)).collect();
        drivers.sort_by(|a, b| a.person.name.cmp(&b.person.name));
        Ok(drivers)
    }

    async fn update(&self, person_id: i32, request: &UpdateDriverRequest) -> AppResult<Driver> {
        let mut data = self.data.write().await;

        if !data.drivers.contains_key(&person_id) {
            return Err(not_found_error(DRIVER_NOT_FOUND_MESSAGE));
        }
        if let Some(document) = request.person.as_ref().and_then(|p| p.document.as_ref()) {
            if data.people.values().any(|p| &p.document == document && p.id != person_id) {
                return Err(conflict_error(DUPLICATE_DRIVER_DOCUMENT_MESSAGE));
            }
        }
        if let Some(cnh) = &request.cnh {
            if data.drivers.iter().any(|(id, d)| &d.cnh == cnh && *id != person_id) {
                return Err(conflict_error(DUPLICATE_CNH_MESSAGE));
            }
        }

        if let (Some(patch), Some(person)) = (&request.person, data.people.get_mut(&person_id)) {
            if let Some(name) = &patch.name {
                person.name = name.clone();
            }
            if let Some(nickname) = &patch.nickname {
                person.nickname = Some(nickname.clone()).filter(|n| !n.is_empty());
            }
            if let Some(document) = &patch.document {
                person.document = document.clone();
            }
            if let Some(phone_number) = &patch.phone_number {
                person.phone_number = Some(phone_number.clone()).filter(|p| !p.is_empty());
            }
            if patch.unit_id.is_some() {
                person.unit_id = patch.unit_id;
            }
        }
        if let (Some(cnh), Some(driver)) = (&request.cnh, data.drivers.get_mut(&person_id)) {
            driver.cnh = cnh.clone();
        }

        data.driver(person_id)
            .ok_or_else(|| not_found_error(DRIVER_NOT_FOUND_MESSAGE))
    }

    async fn delete(&self, person_id: i32) -> AppResult<()> {
        let mut data = self.data.write().await;
        if !data.drivers.contains_key(&person_id) {
            return Err(not_found_error(DRIVER_NOT_FOUND_MESSAGE));
        }
        if data.in_use_by_trips(|t| t.driver_id == Some(person_id))
            || data.in_use_by_groupings(|g| g.driver_id == person_id)
        {
            return Err(conflict_error(IN_USE_MESSAGE));
        }
        data.drivers.remove(&person_id);
        data.people.remove(&person_id);
        Ok(())
    }
}

#[async_trait]
impl VehicleRepository for MemoryStore {
    async fn plate_taken(&self, license_plate: &str, excluding: Option<i32>) -> AppResult<bool> {
        Ok(self.data.read().await.plate_taken(license_plate, excluding))
    }
}

#[async_trait]
impl TruckRepository for MemoryStore {
    async fn create(&self, request: &CreateTruckRequest) -> AppResult<Truck> {
        let mut data = self.data.write().await;

        let vehicle_id = data.insert_vehicle(&request.vehicle)?;
        let id = data.next_id();
        data.trucks.insert(
            id,
            TruckRecord {
                vehicle_id,
                compressor: request.compressor,
                created_at: Utc::now(),
            },
        );

        data.truck(id)
            .ok_or_else(|| not_found_error(TRUCK_NOT_FOUND_MESSAGE))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Truck>> {
        Ok(self.data.read().await.truck(id))
    }

    async fn list_all(&self) -> AppResult<Vec<Truck>> {
        let data = self.data.read().await;
        let mut trucks: Vec<Truck> = data.trucks.keys().filter_map(|id| data.truck(*id)).collect();
        trucks.sort_by(|a, b| a.vehicle.license_plate.cmp(&b.vehicle.license_plate));
        Ok(trucks)
    }

    async fn update(&self, id: i32, request: &UpdateTruckRequest) -> AppResult<Truck> {
        let mut data = self.data.write().await;

        let vehicle_id = data
            .trucks
            .get(&id)
            .map(|t| t.vehicle_id)
            .ok_or_else(|| not_found_error(TRUCK_NOT_FOUND_MESSAGE))?;

        if let Some(patch) = &request.vehicle {
            data.patch_vehicle(vehicle_id, patch)?;
        }
        if let (Some(compressor), Some(truck)) = (request.compressor, data.trucks.get_mut(&id)) {
            truck.compressor = compressor;
        }

        data.truck(id)
            .ok_or_else(|| not_found_error(TRUCK_NOT_FOUND_MESSAGE))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut data = self.data.write().await;
        let vehicle_id = data
            .trucks
            .get(&id)
            .map(|t| t.vehicle_id)
            .ok_or_else(|| not_found_error(TRUCK_NOT_FOUND_MESSAGE))?;

        if data.in_use_by_trips(|t| t.truck_id == Some(id))
            || data.in_use_by_groupings(|g| g.truck_id == id)
        {
            return Err(conflict_error(IN_USE_MESSAGE));
        }

        data.trucks.remove(&id);
        data.vehicles.remove(&vehicle_id);
        Ok(())
    }
}

#[async_trait]
impl SemiTrailerRepository for MemoryStore {
    async fn create(&self, request: &CreateSemiTrailerRequest) -> AppResult<SemiTrailer> {
        let mut data = self.data.write().await;

        // placas primero, para no dejar vehículos sueltos
        for trailer in &request.trailers {
            if data.plate_taken(&trailer.vehicle.license_plate, None) {
                return Err(conflict_error(DUPLICATE_PLATE_MESSAGE));
            }
        }

        let id = data.next_id();
        let cargo_ids = data.cargo_ids(&request.cargos);
        data.semi_trailers.insert(
            id,
            SemiTrailerRecord {
                kind: request.kind.clone(),
                configuration: TrailerConfiguration {
                    name: request.configuration.name.clone(),
                    number_of_trailers: request.configuration.number_of_trailers,
                },
                cargo_ids,
                created_at: Utc::now(),
            },
        );

        for trailer in &request.trailers {
            let vehicle_id = data.insert_vehicle(&trailer.vehicle)?;
            let trailer_id = data.next_id();
            data.trailers.insert(
                trailer_id,
                TrailerRecord {
                    semi_trailer_id: id,
                    vehicle_id,
                    fleet_number: trailer.fleet_number.clone(),
                },
            );
        }

        data.semi_trailer(id)
            .ok_or_else(|| not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<SemiTrailer>> {
        Ok(self.data.read().await.semi_trailer(id))
    }

    async fn list_all(&self) -> AppResult<Vec<SemiTrailer>> {
        let data = self.data.read().await;
        Ok(data
            .semi_trailers
            .keys()
            .filter_map(|id| data.semi_trailer(*id))
            .collect())
    }

    async fn update(&self, id: i32, request: &UpdateSemiTrailerRequest) -> AppResult<SemiTrailer> {
        let mut data = self.data.write().await;

        if !data.semi_trailers.contains_key(&id) {
            return Err(not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE));
        }
        let cargo_ids = request.cargos.as_ref().map(|names| data.cargo_ids(names));

        if let Some(record) = data.semi_trailers.get_mut(&id) {
            if request.kind.is_some() {
                record.kind = request.kind.clone();
            }
            if let Some(configuration) = &request.configuration {
                record.configuration = TrailerConfiguration {
                    name: configuration.name.clone(),
                    number_of_trailers: configuration.number_of_trailers,
                };
            }
            if let Some(cargo_ids) = cargo_ids {
                record.cargo_ids = cargo_ids;
            }
        }

        data.semi_trailer(id)
            .ok_or_else(|| not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut data = self.data.write().await;
        if !data.semi_trailers.contains_key(&id) {
            return Err(not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE));
        }
        if data.in_use_by_trips(|t| t.semi_trailer_id == Some(id))
            || data.in_use_by_groupings(|g| g.semi_trailer_id == id)
        {
            return Err(conflict_error(IN_USE_MESSAGE));
        }

        let trailer_ids: Vec<i32> = data
            .trailers
            .iter()
            .filter(|(_, t)| t.semi_trailer_id == id)
            .map(|(trailer_id, _)| *trailer_id)
            .collect();
        for trailer_id in trailer_ids {
            if let Some(trailer) = data.trailers.remove(&trailer_id) {
                data.vehicles.remove(&trailer.vehicle_id);
            }
        }
        data.semi_trailers.remove(&id);
        Ok(())
    }

    async fn list_cargos(&self) -> AppResult<Vec<Cargo>> {
        let data = self.data.read().await;
        let mut cargos: Vec<Cargo> = data
            .cargos
            .iter()
            .map(|(id, name)| Cargo {
                id: *id,
                name: name.clone(),
            })
            .collect();
        cargos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cargos)
    }
}

#[async_trait]
impl GroupingRepository for MemoryStore {
    async fn create(&self, request: &GroupingRequest) -> AppResult<Grouping> {
        let mut data = self.data.write().await;
        let id = data.next_id();
        let grouping = Grouping {
            id,
            driver_id: request.driver_id,
            truck_id: request.truck_id,
            semi_trailer_id: request.semi_trailer_id,
            created_at: Utc::now(),
        };
        data.groupings.insert(id, grouping.clone());
        Ok(grouping)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Grouping>> {
        Ok(self.data.read().await.groupings.get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Grouping>> {
        Ok(self.data.read().await.groupings.values().cloned().collect())
    }

    async fn update(&self, id: i32, request: &GroupingRequest) -> AppResult<Grouping> {
        let mut data = self.data.write().await;
        let grouping = data
            .groupings
            .get_mut(&id)
            .ok_or_else(|| not_found_error(GROUPING_NOT_FOUND_MESSAGE))?;
        grouping.driver_id = request.driver_id;
        grouping.truck_id = request.truck_id;
        grouping.semi_trailer_id = request.semi_trailer_id;
        Ok(grouping.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut data = self.data.write().await;
        data.groupings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found_error(GROUPING_NOT_FOUND_MESSAGE))
    }
}

#[async_trait]
impl TripRepository for MemoryStore {
    async fn create(&self, fields: &TripFields) -> AppResult<Trip> {
        let trip = Trip::from_fields(Uuid::new_v4(), fields, Utc::now());
        self.data.write().await.trips.insert(trip.id, trip.clone());
        Ok(trip)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Trip>> {
        Ok(self.data.read().await.trips.get(&id).cloned())
    }

    async fn list(&self, filters: &TripFilters) -> AppResult<Vec<Trip>> {
        let data = self.data.read().await;
        let mut trips: Vec<Trip> = data
            .trips
            .values()
            .filter(|t| filters.status.map_or(true, |s| t.status == s))
            .filter(|t| filters.draft.map_or(true, |d| t.draft == d))
            .cloned()
            .collect();
        trips.sort_by(|a, b| {
            b.departed_at
                .cmp(&a.departed_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        let limit = filters.effective_limit() as usize;
        trips.truncate(limit);
        Ok(trips)
    }

    async fn update(&self, id: Uuid, fields: &TripFields) -> AppResult<Trip> {
        let mut data = self.data.write().await;
        let trip = data
            .trips
            .get_mut(&id)
            .ok_or_else(|| not_found_error(TRIP_NOT_FOUND_MESSAGE))?;
        trip.apply(fields, Utc::now());
        Ok(trip.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.data
            .write()
            .await
            .trips
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found_error(TRIP_NOT_FOUND_MESSAGE))
    }

    async fn dashboard_counts(&self, now: DateTime<Utc>) -> AppResult<DashboardCounts> {
        let data = self.data.read().await;
        Ok(tally_counts(data.trips.values(), now))
    }

    async fn scheduled_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<Vec<Trip>> {
        let in_window = |at: Option<DateTime<Utc>>| at.map_or(false, |at| at >= from && at < to);
        let data = self.data.read().await;
        Ok(data
            .trips
            .values()
            .filter(|t| !t.draft && (in_window(t.departed_at) || in_window(t.arrived_at)))
            .cloned()
            .collect())
    }

    async fn in_progress(&self, limit: i64) -> AppResult<Vec<InProgressTrip>> {
        let data = self.data.read().await;
        let mut trips: Vec<&Trip> = data
            .trips
            .values()
            .filter(|t| !t.draft && t.status.is_in_progress())
            .collect();
        trips.sort_by_key(|t| (t.departed_at.is_none(), t.departed_at));
        trips.truncate(limit.max(0) as usize);

        Ok(trips
            .into_iter()
            .map(|trip| {
                let truck_plate = trip
                    .truck_id
                    .and_then(|id| data.truck(id))
                    .map(|t| t.vehicle.license_plate);
                let trailer_plates = trip
                    .semi_trailer_id
                    .and_then(|id| data.semi_trailer(id))
                    .map(|s| s.plates())
                    .filter(|plates| !plates.is_empty());
                let (origin_name, origin_city, origin_state) = data.endpoint(trip.origin_id);
                let (destination_name, destination_city, destination_state) =
                    data.endpoint(trip.destination_id);

                InProgressTrip {
                    id: trip.id,
                    status: trip.status,
                    truck_plate,
                    trailer_plates,
                    origin_name,
                    origin_city,
                    origin_state,
                    destination_name,
                    destination_city,
                    destination_state,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::company_dto::AddressInput;
    use crate::models::company::DocumentType;

    fn company(document: &str) -> CompanyInput {
        CompanyInput {
            name: "VOX CIMENTOS".into(),
            trade_name: None,
            document: document.into(),
            document_type: DocumentType::Cnpj,
            address: Some(AddressInput {
                city: Some("CURITIBA".into()),
                state: Some("PARANÁ".into()),
                ..AddressInput::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_upsert_reuses_company_by_document() {
        let store = MemoryStore::new();
        let first = store.upsert_by_document(&company("93953779000140")).await.unwrap();

        let mut other_name = company("93953779000140");
        other_name.name = "OUTRO NOME".into();
        let second = store.upsert_by_document(&other_name).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "VOX CIMENTOS");
    }

    #[tokio::test]
    async fn test_client_in_use_cannot_be_deleted() {
        let store = MemoryStore::new();
        let client = ClientRepository::create_with_company(&store, &company("93953779000140"))
            .await
            .unwrap();
        TripRepository::create(
            &store,
            &TripFields {
                origin_id: Some(client.company_id),
                ..TripFields::default()
            },
        )
        .await
        .unwrap();

        let err = ClientRepository::delete(&store, client.company_id).await.unwrap_err();
        assert_eq!(err.user_message(), IN_USE_MESSAGE);
    }

    #[tokio::test]
    async fn test_unit_delete_keeps_company() {
        let store = MemoryStore::new();
        let unit = UnitRepository::create_with_company(&store, Some("STZ"), &company("12345678000100"))
            .await
            .unwrap();

        UnitRepository::delete(&store, unit.company_id).await.unwrap();

        assert!(UnitRepository::find_by_company_id(&store, unit.company_id)
            .await
            .unwrap()
            .is_none());
        assert!(CompanyRepository::find_by_id(&store, unit.company_id)
            .await
            .unwrap()
            .is_some());
    }
}
