//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP con el formato `{ "error": ... }`.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::dto::action_response::ActionResponse;

/// Mensaje para errores inesperados fuera de una acción concreta
pub const GENERIC_ERROR_MESSAGE: &str = "Ocorreu um erro, tente novamente mais tarde";

/// Mensaje para violaciones de foreign key al excluir
pub const IN_USE_MESSAGE: &str = "Não é possível excluir: o registro está em uso";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Error ya enmascarado con el mensaje genérico de la acción
    #[error("{0}")]
    Unexpected(String),
}

/// Tipo de acción, usado para elegir el mensaje genérico de error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Create,
    Update,
    Delete,
    Load,
}

impl ActionKind {
    pub fn generic_message(self) -> &'static str {
        match self {
            ActionKind::Create => "Ocorreu um erro ao criar, tente novamente mais tarde",
            ActionKind::Update => "Ocorreu um erro ao atualizar, tente novamente mais tarde",
            ActionKind::Delete => "Ocorreu um erro ao excluir, tente novamente mais tarde",
            ActionKind::Load => "Ocorreu um erro ao carregar, tente novamente mais tarde",
        }
    }
}

impl AppError {
    /// Convierte errores inesperados en el mensaje genérico de la acción.
    ///
    /// Los conflictos, validaciones y not-found pasan sin cambios; el error
    /// original solo queda en los logs.
    pub fn for_action(self, kind: ActionKind) -> Self {
        match self {
            AppError::Database(e) => {
                error!("❌ Error de base de datos ({:?}): {}", kind, e);
                AppError::Unexpected(kind.generic_message().to_string())
            }
            other => other,
        }
    }

    /// Mensaje visible para el usuario
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => GENERIC_ERROR_MESSAGE.to_string(),
            AppError::Validation(_) => "Dados inválidos".to_string(),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Unexpected(msg) => msg.clone(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::Validation(errors) => {
                warn!("⚠️ Validation error: {}", errors);
                ActionResponse::<()>::error_with_details(self.user_message(), json!(errors))
            }
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                ActionResponse::error(self.user_message())
            }
            _ => ActionResponse::error(self.user_message()),
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación de un campo
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    errors.add(field, field_error(message));
    AppError::Validation(errors)
}

/// Crear un `ValidationError` con mensaje legible
pub fn field_error(message: &'static str) -> validator::ValidationError {
    let mut error = validator::ValidationError::new("custom");
    error.message = Some(message.into());
    error
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(message: &str) -> AppError {
    AppError::NotFound(message.to_string())
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(message: &str) -> AppError {
    AppError::Conflict(message.to_string())
}

/// Verifica si el error es una violación de unicidad (SQLSTATE 23505)
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Verifica si el error es una violación de foreign key (SQLSTATE 23503)
pub fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}

/// Mapear una violación de unicidad al conflicto con el mensaje indicado
pub fn unique_as_conflict(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if is_unique_violation(&e) {
            AppError::Conflict(message.to_string())
        } else {
            AppError::Database(e)
        }
    }
}

/// Mapear una violación de foreign key en un DELETE a conflicto
pub fn in_use_as_conflict(e: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&e) {
        AppError::Conflict(IN_USE_MESSAGE.to_string())
    } else {
        AppError::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_action_masks_database_errors() {
        let masked = AppError::Database(sqlx::Error::RowNotFound).for_action(ActionKind::Create);
        assert_eq!(
            masked.user_message(),
            "Ocorreu um erro ao criar, tente novamente mais tarde"
        );

        let masked = AppError::Database(sqlx::Error::PoolTimedOut).for_action(ActionKind::Update);
        assert_eq!(
            masked.user_message(),
            "Ocorreu um erro ao atualizar, tente novamente mais tarde"
        );
    }

    #[test]
    fn test_for_action_keeps_domain_errors() {
        let conflict = conflict_error("Já existe uma unidade com esse identificador")
            .for_action(ActionKind::Create);
        assert!(matches!(conflict, AppError::Conflict(_)));
        assert_eq!(
            conflict.user_message(),
            "Já existe uma unidade com esse identificador"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(not_found_error("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(conflict_error("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            validation_error("name", "Informe o nome").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unique_mapping_ignores_other_errors() {
        let mapped = unique_as_conflict("dup")(sqlx::Error::RowNotFound);
        assert!(matches!(mapped, AppError::Database(_)));
        assert!(matches!(in_use_as_conflict(sqlx::Error::PoolClosed), AppError::Database(_)));
    }
}
