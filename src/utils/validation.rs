//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! (documentos, placas, CEP) y normalización de entradas.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Placa antigua (ABC-1234) o Mercosul (ABC1D23)
    static ref LICENSE_PLATE: Regex = Regex::new(r"^[A-Z]{3}-?[0-9][A-Z0-9][0-9]{2}$").unwrap();
    static ref ZIP_CODE: Regex = Regex::new(r"^[0-9]{5}-?[0-9]{3}$").unwrap();
    static ref YEAR: Regex = Regex::new(r"^(19|20)[0-9]{2}$").unwrap();
}

/// Quitar todo lo que no sea dígito (máscaras de CNPJ/CPF/teléfono)
pub fn only_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Trim + mayúsculas; cadenas vacías pasan a `None`
pub fn normalize_upper(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}

/// Trim; cadenas vacías pasan a `None`
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.message = Some("Campo obrigatório".into());
        return Err(error);
    }
    Ok(())
}

/// Validar CNPJ (14 dígitos) o CPF (11 dígitos), con o sin máscara
pub fn validate_document(value: &str) -> Result<(), ValidationError> {
    let digits = only_digits(value);
    if digits.len() != 11 && digits.len() != 14 {
        let mut error = ValidationError::new("document");
        error.message = Some("Documento deve ter 11 (CPF) ou 14 (CNPJ) dígitos".into());
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar CPF (11 dígitos)
pub fn validate_cpf(value: &str) -> Result<(), ValidationError> {
    if only_digits(value).len() != 11 {
        let mut error = ValidationError::new("cpf");
        error.message = Some("CPF deve ter 11 dígitos".into());
        return Err(error);
    }
    Ok(())
}

/// Validar CNH (11 dígitos)
pub fn validate_cnh(value: &str) -> Result<(), ValidationError> {
    if only_digits(value).len() != 11 {
        let mut error = ValidationError::new("cnh");
        error.message = Some("CNH deve ter 11 dígitos".into());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de placa de veículo
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    let plate = value.trim().to_uppercase();
    if !LICENSE_PLATE.is_match(&plate) {
        let mut error = ValidationError::new("license_plate");
        error.message = Some("Placa inválida".into());
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar CEP (12345-678 o 12345678)
pub fn validate_zip_code(value: &str) -> Result<(), ValidationError> {
    if !ZIP_CODE.is_match(value.trim()) {
        let mut error = ValidationError::new("zip_code");
        error.message = Some("CEP inválido".into());
        return Err(error);
    }
    Ok(())
}

/// Validar año de fabricación (4 dígitos)
pub fn validate_year(value: &str) -> Result<(), ValidationError> {
    if !YEAR.is_match(value.trim()) {
        let mut error = ValidationError::new("year");
        error.message = Some("Ano inválido".into());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let clean_phone = only_digits(value);
    if clean_phone.len() < 10 || clean_phone.len() > 13 {
        let mut error = ValidationError::new("phone");
        error.message = Some("Telefone inválido".into());
        return Err(error);
    }
    Ok(())
}

/// Sigla de la UF a partir del nombre del estado ("SANTA CATARINA" -> "SC")
pub fn format_state(state: Option<&str>) -> Option<String> {
    let state = state?.trim();
    if state.is_empty() {
        return None;
    }
    if state.len() == 2 {
        return Some(state.to_uppercase());
    }

    let uf = match state.to_uppercase().as_str() {
        "ACRE" => "AC",
        "ALAGOAS" => "AL",
        "AMAPÁ" | "AMAPA" => "AP",
        "AMAZONAS" => "AM",
        "BAHIA" => "BA",
        "CEARÁ" | "CEARA" => "CE",
        "DISTRITO FEDERAL" => "DF",
        "ESPÍRITO SANTO" | "ESPIRITO SANTO" => "ES",
        "GOIÁS" | "GOIAS" => "GO",
        "MARANHÃO" | "MARANHAO" => "MA",
        "MATO GROSSO" => "MT",
        "MATO GROSSO DO SUL" => "MS",
        "MINAS GERAIS" => "MG",
        "PARÁ" | "PARA" => "PA",
        "PARAÍBA" | "PARAIBA" => "PB",
        "PARANÁ" | "PARANA" => "PR",
        "PERNAMBUCO" => "PE",
        "PIAUÍ" | "PIAUI" => "PI",
        "RIO DE JANEIRO" => "RJ",
        "RIO GRANDE DO NORTE" => "RN",
        "RIO GRANDE DO SUL" => "RS",
        "RONDÔNIA" | "RONDONIA" => "RO",
        "RORAIMA" => "RR",
        "SANTA CATARINA" => "SC",
        "SÃO PAULO" | "SAO PAULO" => "SP",
        "SERGIPE" => "SE",
        "TOCANTINS" => "TO",
        _ => return Some(state.to_string()),
    };
    Some(uf.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_document() {
        assert!(validate_document("12345678000100").is_ok());
        assert!(validate_document("12.345.678/0001-00").is_ok());
        assert!(validate_document("106.402.540-47").is_ok());
        assert!(validate_document("1234").is_err());
    }

    #[test]
    fn test_validate_license_plate() {
        assert!(validate_license_plate("HJK-8901").is_ok());
        assert!(validate_license_plate("opq5678").is_ok());
        assert!(validate_license_plate("ABC1D23").is_ok());
        assert!(validate_license_plate("A").is_err());
        assert!(validate_license_plate("ABCD-123").is_err());
    }

    #[test]
    fn test_validate_zip_code() {
        assert!(validate_zip_code("88745-000").is_ok());
        assert!(validate_zip_code("81280140").is_ok());
        assert!(validate_zip_code("8874-000").is_err());
    }

    #[test]
    fn test_validate_cnh_and_phone() {
        assert!(validate_cnh("70315808200").is_ok());
        assert!(validate_cnh("7031580820").is_err());
        assert!(validate_phone("48985456478").is_ok());
        assert!(validate_phone("123").is_err());
    }

    #[test]
    fn test_normalize_upper() {
        assert_eq!(normalize_upper(Some("  stz ")), Some("STZ".to_string()));
        assert_eq!(normalize_upper(Some("   ")), None);
        assert_eq!(normalize_upper(None), None);
    }

    #[test]
    fn test_format_state() {
        assert_eq!(format_state(Some("SANTA CATARINA")), Some("SC".to_string()));
        assert_eq!(format_state(Some("Paraná")), Some("PR".to_string()));
        assert_eq!(format_state(Some("sp")), Some("SP".to_string()));
        assert_eq!(format_state(Some("")), None);
        assert_eq!(format_state(None), None);
    }
}
