//! Controllers (acciones)
//!
//! Cada controller se construye por request a partir del `AppState` y
//! devuelve `AppResult`, con los errores inesperados ya enmascarados con el
//! mensaje genérico de la acción.

pub mod client_controller;
pub mod company_controller;
pub mod driver_controller;
pub mod grouping_controller;
pub mod semi_trailer_controller;
pub mod trip_controller;
pub mod truck_controller;
pub mod unit_controller;
