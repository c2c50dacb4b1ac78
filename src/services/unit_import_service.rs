//! Importación de unidades desde planilla CSV
//!
//! Columnas: `Nome, Nome fantasia, CNPJ, CEP, Estado, Cidade, Endereço`.
//! Cada fila se crea como unidad sin identificador; los errores se reportan
//! por fila (1-based) sin interrumpir la importación.

use tracing::{info, warn};

use crate::controllers::unit_controller::UnitController;
use crate::dto::unit_dto::{CreateUnitRequest, ImportReport, ImportRowError, UnitImportRow};
use crate::state::AppState;

pub const INVALID_ROW_MESSAGE: &str = "Linha inválida na planilha";

pub struct UnitImportService {
    units: UnitController,
}

impl UnitImportService {
    pub fn new(state: &AppState) -> Self {
        Self {
            units: UnitController::new(state),
        }
    }

    pub async fn import(&self, csv_text: &str) -> ImportReport {
        let records: Vec<csv::Result<UnitImportRow>> = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(csv_text.as_bytes())
            .deserialize()
            .collect();

        let mut report = ImportReport::default();
        for (index, record) in records.into_iter().enumerate() {
            let row = index + 1;
            let request = match record {
                Ok(record) => CreateUnitRequest::from(record),
                Err(e) => {
                    warn!("⚠️ Linha {} ignorada: {}", row, e);
                    report.failed.push(ImportRowError {
                        row,
                        error: INVALID_ROW_MESSAGE.to_string(),
                    });
                    continue;
                }
            };

            match self.units.create(request).await {
                Ok(_) => report.created += 1,
                Err(e) => report.failed.push(ImportRowError {
                    row,
                    error: e.user_message(),
                }),
            }
        }

        info!(
            "📥 Importação de unidades: {} criadas, {} com erro",
            report.created,
            report.failed.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "Nome,Nome fantasia,CNPJ,CEP,Estado,Cidade,Endereço
Cimentos Sul Ltda,Cimentos Sul,11.222.333/0001-81,80010-000,PARANÁ,Curitiba,Rua XV 100
Sem Documento,,,,,,
Cimentos Sul Filial,,11222333000181,,PR,Curitiba,
";

    #[tokio::test]
    async fn test_import_reports_per_row() {
        let state = AppState::in_memory();
        let report = UnitImportService::new(&state).import(SHEET).await;

        assert_eq!(report.created, 1);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].row, 2);
        assert_eq!(report.failed[1].row, 3);
        assert_eq!(
            report.failed[1].error,
            "Já existe uma unidade para essa empresa"
        );
    }

    #[tokio::test]
    async fn test_empty_sheet() {
        let state = AppState::in_memory();
        let report = UnitImportService::new(&state)
            .import("Nome,Nome fantasia,CNPJ,CEP,Estado,Cidade,Endereço\n")
            .await;
        assert_eq!(report, ImportReport::default());
    }
}
