//! Client for the virtual ATC community platform.
//!
//! The `data` feature exposes the typed records, forms and paging helpers on
//! their own. The default `client` feature adds the HTTP API, the session
//! lifecycle, permission-gated services and the command-line front end.

pub mod domain;
pub mod dto;
pub mod forms;
pub mod pagination;

#[cfg(feature = "client")]
pub mod api;
#[cfg(feature = "client")]
pub mod cli;
#[cfg(feature = "client")]
pub mod error_conversions;
#[cfg(feature = "client")]
pub mod middleware;
#[cfg(feature = "client")]
pub mod models;
#[cfg(feature = "client")]
pub mod services;
#[cfg(feature = "client")]
pub mod session;
