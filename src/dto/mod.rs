//! DTOs de entrada y salida de las acciones

pub mod action_response;
pub mod client_dto;
pub mod company_dto;
pub mod dashboard_dto;
pub mod driver_dto;
pub mod grouping_dto;
pub mod trip_dto;
pub mod unit_dto;
pub mod vehicle_dto;
