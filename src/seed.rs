//! Datos de ejemplo
//!
//! Inserta fixtures a través de los mismos controllers de la API. Las
//! companies se reutilizan por documento, así que re-ejecutar solo reporta
//! conflictos para el resto.

use std::fmt::Display;

use tracing::{info, warn};

use crate::controllers::client_controller::ClientController;
use crate::controllers::driver_controller::DriverController;
use crate::controllers::semi_trailer_controller::SemiTrailerController;
use crate::controllers::truck_controller::TruckController;
use crate::controllers::unit_controller::UnitController;
use crate::dto::client_dto::CreateClientRequest;
use crate::dto::company_dto::{AddressInput, CompanyInput};
use crate::dto::driver_dto::{CreateDriverRequest, PersonInput};
use crate::dto::unit_dto::CreateUnitRequest;
use crate::dto::vehicle_dto::{
    ConfigurationInput, CreateSemiTrailerRequest, CreateTruckRequest, TrailerInput, VehicleInput,
};
use crate::models::company::DocumentType;
use crate::state::AppState;
use crate::utils::errors::AppResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

impl SeedReport {
    fn record<T>(&mut self, label: impl Display, result: AppResult<T>) {
        match result {
            Ok(_) => {
                self.created += 1;
                info!("🌱 {} criado", label);
            }
            Err(e) => {
                self.skipped += 1;
                warn!("⚠️ {} ignorado: {}", label, e.user_message());
            }
        }
    }
}

pub async fn run(state: &AppState) -> SeedReport {
    let mut report = SeedReport::default();

    let units = UnitController::new(state);
    for (identifier, company) in [
        (
            "STZ",
            company(
                "TRANSPORTES SANTA CRUZ LTDA",
                Some("SANTA CRUZ"),
                "12345678000100",
                ("88301-000", "SANTA CATARINA", "ITAJAÍ", "RUA BLUMENAU, 1200"),
            ),
        ),
        (
            "CWB",
            company(
                "SANTA CRUZ LOGÍSTICA CURITIBA LTDA",
                None,
                "98765432000155",
                ("81200-000", "PR", "CURITIBA", "RODOVIA BR-277, KM 2"),
            ),
        ),
    ] {
        let result = units
            .create(CreateUnitRequest {
                identifier: Some(identifier.to_string()),
                company,
            })
            .await;
        report.record(format!("Unidade {}", identifier), result);
    }

    let clients = ClientController::new(state);
    for company in [
        company(
            "CIMENTOS DO SUL SA",
            Some("CIMENTOS DO SUL"),
            "11222333000181",
            ("83540-000", "PARANÁ", "RIO BRANCO DO SUL", "ESTRADA DA CAL, S/N"),
        ),
        company(
            "CONSTRUTORA LITORAL LTDA",
            None,
            "44555666000122",
            ("88010-000", "SC", "FLORIANÓPOLIS", "AV. BEIRA-MAR, 500"),
        ),
    ] {
        let label = format!("Cliente {}", company.name);
        let result = clients.create(CreateClientRequest { company }).await;
        report.record(label, result);
    }

    let driver = DriverController::new(state)
        .create(CreateDriverRequest {
            person: PersonInput {
                name: "João da Silva".into(),
                nickname: Some("Joãozinho".into()),
                document: "529.982.247-25".into(),
                phone_number: Some("(47) 99999-8888".into()),
                unit_id: None,
            },
            cnh: "12345678900".into(),
        })
        .await;
    report.record("Motorista JOÃO DA SILVA", driver);

    let truck = TruckController::new(state)
        .create(CreateTruckRequest {
            vehicle: vehicle("RST1A23", "SCANIA", "R450"),
            compressor: true,
        })
        .await;
    report.record("Cavalo RST1A23", truck);

    let semi_trailer = SemiTrailerController::new(state)
        .create(CreateSemiTrailerRequest {
            kind: Some("SILO".into()),
            configuration: ConfigurationInput {
                name: "LS".into(),
                number_of_trailers: 1,
            },
            cargos: vec!["CIMENTO".into(), "CAL".into()],
            trailers: vec![TrailerInput {
                vehicle: vehicle("OPQ5678", "RANDON", "SILO 4 EIXOS"),
                fleet_number: Some("4002".into()),
            }],
        })
        .await;
    report.record("Conjunto OPQ-5678", semi_trailer);

    info!(
        "🌱 Seed terminado: {} criados, {} ignorados",
        report.created, report.skipped
    );
    report
}

fn company(
    name: &str,
    trade_name: Option<&str>,
    document: &str,
    (zip_code, state, city, locale): (&str, &str, &str, &str),
) -> CompanyInput {
    CompanyInput {
        name: name.to_string(),
        trade_name: trade_name.map(str::to_string),
        document: document.to_string(),
        document_type: DocumentType::Cnpj,
        address: Some(AddressInput {
            zip_code: Some(zip_code.to_string()),
            state: Some(state.to_string()),
            city: Some(city.to_string()),
            locale: Some(locale.to_string()),
        }),
    }
}

fn vehicle(license_plate: &str, brand: &str, model: &str) -> VehicleInput {
    VehicleInput {
        license_plate: license_plate.to_string(),
        brand: Some(brand.to_string()),
        model: Some(model.to_string()),
        year: Some("2021".to_string()),
        renavam: Some("00123456789".to_string()),
        axle: Some(3),
        unit_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let state = AppState::in_memory();

        let first = run(&state).await;
        assert_eq!(first, SeedReport { created: 7, skipped: 0 });

        let second = run(&state).await;
        assert_eq!(second, SeedReport { created: 0, skipped: 7 });
    }
}
