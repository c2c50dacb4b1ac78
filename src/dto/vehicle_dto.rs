use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::utils::validation::{
    normalize_optional, normalize_upper, only_digits, validate_license_plate, validate_year,
};

// Datos comunes de un vehículo
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct VehicleInput {
    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,

    #[validate(length(min = 1, max = 100))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(custom = "validate_year")]
    pub year: Option<String>,

    #[validate(length(min = 9, max = 11))]
    pub renavam: Option<String>,

    #[validate(range(min = 1, max = 12))]
    pub axle: Option<i32>,

    pub unit_id: Option<i32>,
}

impl VehicleInput {
    pub fn normalized(self) -> Self {
        Self {
            license_plate: normalize_plate(&self.license_plate),
            brand: normalize_upper(self.brand.as_deref()),
            model: normalize_upper(self.model.as_deref()),
            year: normalize_optional(self.year.as_deref()),
            renavam: self.renavam.map(|r| only_digits(&r)),
            axle: self.axle,
            unit_id: self.unit_id,
        }
    }
}

/// Placa en mayúsculas con guion en el formato antiguo (ABC1234 -> ABC-1234)
pub fn normalize_plate(plate: &str) -> String {
    let plate: String = plate
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let old_format = plate.len() == 7 && plate[3..].chars().all(|c| c.is_ascii_digit());
    if old_format {
        format!("{}-{}", &plate[..3], &plate[3..])
    } else {
        plate
    }
}

// Datos parciales de un vehículo
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct VehiclePatch {
    #[validate(custom = "validate_license_plate")]
    pub license_plate: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(custom = "validate_year")]
    pub year: Option<String>,

    #[validate(length(min = 9, max = 11))]
    pub renavam: Option<String>,

    #[validate(range(min = 1, max = 12))]
    pub axle: Option<i32>,

    pub unit_id: Option<i32>,
}

impl VehiclePatch {
    pub fn normalized(self) -> Self {
        Self {
            license_plate: self.license_plate.map(|p| normalize_plate(&p)),
            brand: self.brand.map(|b| b.trim().to_uppercase()),
            model: self.model.map(|m| m.trim().to_uppercase()),
            year: self.year.map(|y| y.trim().to_string()),
            renavam: self.renavam.map(|r| only_digits(&r)),
            axle: self.axle,
            unit_id: self.unit_id,
        }
    }
}

// Request para crear un cavalo
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTruckRequest {
    #[validate]
    pub vehicle: VehicleInput,

    #[serde(default)]
    pub compressor: bool,
}

// Request para actualizar un cavalo
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTruckRequest {
    #[validate]
    pub vehicle: Option<VehiclePatch>,

    pub compressor: Option<bool>,
}

// Carreta dentro de un conjunto
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct TrailerInput {
    #[validate]
    pub vehicle: VehicleInput,

    #[validate(length(max = 20))]
    pub fleet_number: Option<String>,
}

// Configuración del conjunto
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct ConfigurationInput {
    #[validate(length(min = 1, max = 50, message = "Informe a configuração"))]
    pub name: String,

    #[validate(range(min = 1, max = 4))]
    pub number_of_trailers: i32,
}

// Request para crear un conjunto (semi-reboque)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_trailers"))]
pub struct CreateSemiTrailerRequest {
    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub kind: Option<String>,

    #[validate]
    pub configuration: ConfigurationInput,

    #[serde(default)]
    pub cargos: Vec<String>,

    #[validate]
    pub trailers: Vec<TrailerInput>,
}

impl CreateSemiTrailerRequest {
    pub fn normalized(self) -> Self {
        Self {
            kind: normalize_upper(self.kind.as_deref()),
            configuration: ConfigurationInput {
                name: self.configuration.name.trim().to_uppercase(),
                number_of_trailers: self.configuration.number_of_trailers,
            },
            cargos: normalize_cargos(self.cargos),
            trailers: self
                .trailers
                .into_iter()
                .map(|t| TrailerInput {
                    vehicle: t.vehicle.normalized(),
                    fleet_number: normalize_optional(t.fleet_number.as_deref()),
                })
                .collect(),
        }
    }
}

/// Nombres de carga en mayúsculas, sin vacíos ni duplicados (orden preservado)
pub fn normalize_cargos(cargos: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    cargos
        .into_iter()
        .filter_map(|c| normalize_upper(Some(&c)))
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

fn validate_trailers(request: &CreateSemiTrailerRequest) -> Result<(), ValidationError> {
    if request.trailers.len() != request.configuration.number_of_trailers as usize {
        let mut error = ValidationError::new("trailers");
        error.message =
            Some("A quantidade de carretas não corresponde à configuração".into());
        return Err(error);
    }

    let mut plates = HashSet::new();
    let duplicated = request
        .trailers
        .iter()
        .any(|t| !plates.insert(normalize_plate(&t.vehicle.license_plate)));
    if duplicated {
        let mut error = ValidationError::new("trailers");
        error.message = Some("Placas repetidas no conjunto".into());
        return Err(error);
    }

    Ok(())
}

// Request para actualizar un conjunto (las carretas no se reemplazan)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSemiTrailerRequest {
    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub kind: Option<String>,

    #[validate]
    pub configuration: Option<ConfigurationInput>,

    pub cargos: Option<Vec<String>>,
}

impl UpdateSemiTrailerRequest {
    pub fn normalized(self) -> Self {
        Self {
            kind: self.kind.map(|k| k.trim().to_uppercase()),
            configuration: self.configuration.map(|c| ConfigurationInput {
                name: c.name.trim().to_uppercase(),
                number_of_trailers: c.number_of_trailers,
            }),
            cargos: self.cargos.map(normalize_cargos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trailer(plate: &str) -> TrailerInput {
        TrailerInput {
            vehicle: VehicleInput {
                license_plate: plate.into(),
                brand: Some("RANDON".into()),
                model: None,
                year: Some("2022".into()),
                renavam: Some("63103003248".into()),
                axle: Some(4),
                unit_id: None,
            },
            fleet_number: Some("4002".into()),
        }
    }

    fn semi_trailer(trailers: Vec<TrailerInput>, number_of_trailers: i32) -> CreateSemiTrailerRequest {
        CreateSemiTrailerRequest {
            kind: Some("SILO".into()),
            configuration: ConfigurationInput {
                name: "LS".into(),
                number_of_trailers,
            },
            cargos: vec!["cimento".into()],
            trailers,
        }
    }

    #[test]
    fn test_normalize_plate() {
        assert_eq!(normalize_plate("hjk8901"), "HJK-8901");
        assert_eq!(normalize_plate("HJK-8901"), "HJK-8901");
        assert_eq!(normalize_plate("abc1d23"), "ABC1D23");
    }

    #[test]
    fn test_trailer_count_must_match_configuration() {
        assert!(semi_trailer(vec![trailer("OPQ-5678")], 1).validate().is_ok());
        assert!(semi_trailer(vec![trailer("OPQ-5678")], 2).validate().is_err());
    }

    #[test]
    fn test_duplicated_trailer_plates() {
        let request = semi_trailer(vec![trailer("OPQ-5678"), trailer("opq5678")], 2);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_normalize_cargos() {
        let cargos = normalize_cargos(vec!["cimento".into(), " CIMENTO ".into(), "".into(), "cal".into()]);
        assert_eq!(cargos, vec!["CIMENTO".to_string(), "CAL".to_string()]);
    }
}
