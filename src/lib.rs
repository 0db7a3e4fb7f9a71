// Library exports for folio
// This allows integration tests and external code to use folio modules

pub mod access;
pub mod api;
pub mod config;
pub mod contact;
pub mod error;
pub mod extractors;
pub mod forms;
pub mod imaging;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod state;
