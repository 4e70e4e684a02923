//! Locations of the source files, read from the environment.

use std::path::PathBuf;

/// Default occurrence table when `CRIMINAL_FILE` is unset.
pub const DEFAULT_CRIMINAL_FILE: &str = "SPDadosCriminais_SAO_PAULO_limpo.xlsx";
/// Default events file when `EVENTOS_FILE` is unset.
pub const DEFAULT_EVENTS_FILE: &str = "eventos_estruturados.json";
/// Default venues file when `LOCAIS_FILE` is unset.
pub const DEFAULT_VENUES_FILE: &str = "locais.json";

/// Paths of the three startup inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Criminal occurrence table: a workbook (`.xlsx`, `.xls`, `.ods`, ...)
    /// or a delimited text export.
    pub criminal_file: PathBuf,
    /// JSON array of scheduled events.
    pub events_file: PathBuf,
    /// JSON array of venues referenced by the events.
    pub venues_file: PathBuf,
}

impl DataPaths {
    /// Reads `CRIMINAL_FILE`, `EVENTOS_FILE` and `LOCAIS_FILE`, falling back
    /// to the default file names in the working directory.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            criminal_file: env_path("CRIMINAL_FILE", DEFAULT_CRIMINAL_FILE),
            events_file: env_path("EVENTOS_FILE", DEFAULT_EVENTS_FILE),
            venues_file: env_path("LOCAIS_FILE", DEFAULT_VENUES_FILE),
        }
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(default), PathBuf::from)
}
