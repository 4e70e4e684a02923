//! Neighborhood-to-zone classification.
//!
//! The zone membership table is a TOML document baked into the binary at
//! compile time via [`include_str!`]. Zones are evaluated in file order;
//! when a neighborhood appears in more than one zone, the last one wins.

use std::collections::HashMap;

use crime_dashboard_dataset_models::Region;
use serde::Deserialize;

use crate::DatasetError;

/// Zone table for São Paulo, embedded at compile time.
const SAO_PAULO_ZONES: &str = include_str!("../zones/sao_paulo.toml");

#[derive(Debug, Deserialize)]
struct ZoneFile {
    zones: Vec<ZoneDefinition>,
}

/// One zone as written in the TOML table.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneDefinition {
    /// Local name of the zone (e.g. `"Zona Norte"`).
    pub name: String,
    /// Region assigned to every member neighborhood.
    pub region: Region,
    /// Exact neighborhood names belonging to this zone.
    pub neighborhoods: Vec<String>,
}

/// Read-only lookup from neighborhood name to [`Region`].
#[derive(Debug, Clone)]
pub struct ZoneTable {
    zones: Vec<ZoneDefinition>,
    lookup: HashMap<String, Region>,
}

impl ZoneTable {
    /// Parses the embedded São Paulo zone table.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ZoneTable`] if the embedded TOML is malformed.
    pub fn embedded() -> Result<Self, DatasetError> {
        Self::from_toml(SAO_PAULO_ZONES)
    }

    /// Parses a zone table from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ZoneTable`] if the TOML is malformed.
    pub fn from_toml(source: &str) -> Result<Self, DatasetError> {
        let file: ZoneFile = toml::from_str(source)?;
        Ok(Self::new(file.zones))
    }

    /// Builds the lookup from zones in evaluation order.
    #[must_use]
    pub fn new(zones: Vec<ZoneDefinition>) -> Self {
        let mut lookup = HashMap::new();
        for zone in &zones {
            for neighborhood in &zone.neighborhoods {
                lookup.insert(neighborhood.clone(), zone.region);
            }
        }
        Self { zones, lookup }
    }

    /// Zones in evaluation order.
    #[must_use]
    pub fn zones(&self) -> &[ZoneDefinition] {
        &self.zones
    }

    /// Returns the zone listing `neighborhood`, or `None` if no zone does.
    #[must_use]
    pub fn lookup(&self, neighborhood: &str) -> Option<Region> {
        self.lookup.get(neighborhood).copied()
    }

    /// Classifies a neighborhood, falling back to [`Region::Other`].
    #[must_use]
    pub fn classify(&self, neighborhood: Option<&str>) -> Region {
        neighborhood
            .and_then(|n| self.lookup(n))
            .unwrap_or_default()
    }
}
