use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    DatabaseSettings, ReportSettings, ServerSettings, Settings, TeamRanksSettings,
    TrancheSettings,
};

/// The configuration file read when no other path is given.
pub const DEFAULT_CONFIG_PATH: &str = "reports.toml";

/// Loads the service configuration.
///
/// The TOML file at `path` is optional. Values from it are overridden by
/// `REPORTS__<SECTION>__<KEY>` environment variables, e.g. `REPORTS__SERVER__PORT=9000`.
/// The merged result is validated before it is returned.
pub fn load_config(path: &str) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("REPORTS")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("tranche.epf_payee_ids"),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(path, "Configuration loaded");
    Ok(settings)
}
