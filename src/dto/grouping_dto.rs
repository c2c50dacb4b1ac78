use serde::{Deserialize, Serialize};
use validator::Validate;

// Request para crear o reemplazar un grouping
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct GroupingRequest {
    #[validate(range(min = 1))]
    pub driver_id: i32,

    #[validate(range(min = 1))]
    pub truck_id: i32,

    #[validate(range(min = 1))]
    pub semi_trailer_id: i32,
}
