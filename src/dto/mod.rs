//! Wire-level DTOs that bridge the API layer with domain records.

pub mod api;
