/// Types shared between the Voz downloader and scheduler.
pub mod errors;
pub mod models;
pub mod resolver;
