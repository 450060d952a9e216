pub mod toml_config;

pub use toml_config::{AppConfig, FirebaseConfig, LibrariesConfig, PlexConfig, CONFIG_PATH_ENV};
