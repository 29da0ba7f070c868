//! Domain records exchanged with the platform API.

pub mod activity;
pub mod announcement;
pub mod audit_log;
pub mod controller;
pub mod flight_plan;
pub mod online;
pub mod permission;
pub mod server;
pub mod ticket;
pub mod types;
pub mod user;
