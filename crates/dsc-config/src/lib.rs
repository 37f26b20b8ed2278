//! Typed configuration for the DSC pull server.
//!
//! Configuration is layered; later layers override earlier ones:
//!
//! 1. Built-in defaults
//! 2. A TOML or JSON file, chosen by extension
//! 3. A `.env` file
//! 4. Environment variables under a prefix (conventionally `DSC`)
//!
//! Unknown keys in a file are rejected.
//!
//! # Example
//!
//! ```no_run
//! use dsc_config::ConfigLoader;
//!
//! # fn main() -> Result<(), dsc_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("pull-server.toml")?
//!     .with_dotenv()?
//!     .with_env_prefix("DSC")
//!     .load()?;
//!
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8000"
//! max_body_bytes = 1048576
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [auth]
//! keys = ["f65e1a0c-46b0-424c-a6a5-c3701aef32e5"]
//!
//! [storage.configuration]
//! kind = "local"
//! root = "/srv/dsc"
//!
//! [storage.reports]
//! kind = "memory"
//!
//! [storage.status]
//! kind = "local"
//! path = "/var/lib/dsc/status"
//! ```

#![doc(html_root_url = "https://docs.rs/dsc-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::PullServerConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    AuthConfig, ConfigurationKind, ConfigurationStorage, LoggingConfig, ReportStorage,
    ServerConfig, StaticModule, StatusStorage, StorageConfig, StoreKind,
};
