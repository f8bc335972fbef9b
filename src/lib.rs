// Biblioteca raíz del crate `horagen`.
// Reexporta los módulos principales y la función `run_server` que levanta
// la API HTTP del generador de horarios.
pub mod algorithm;
pub mod api_json;
pub mod excel;
pub mod grafico;
pub mod models;
pub mod server;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
