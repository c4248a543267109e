//! Parcel records and where they come from.

#[cfg(feature = "postgres")]
mod postgres;

use anyhow::Result;

use crate::common::normalize_label;

#[cfg(feature = "postgres")]
pub use self::postgres::{ConnectionConfig, PostgresSource, build_query};

/// Default number of rows pulled per round trip.
pub const DEFAULT_FETCH_SIZE: usize = 2000;

/// One row of the parcel stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParcelRecord {
    pub district: String,
    pub sub_district: String,
    pub block: String,
    pub parcel: String,
    /// WKT or EWKT; `None` when the column is null.
    pub geometry: Option<String>,
}

impl ParcelRecord {
    /// Normalised display text, `"{sub_district}-{parcel}-{block}"`.
    pub fn label(&self) -> String {
        normalize_label(&format!("{}-{}-{}", self.sub_district, self.parcel, self.block))
    }

    /// True when the geometry column is null or blank.
    #[inline]
    pub fn has_empty_geometry(&self) -> bool {
        self.geometry.as_deref().is_none_or(|g| g.trim().is_empty())
    }
}

/// Which parcels to read and in which spatial reference.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Restrict to these district names; empty means every district.
    pub districts: Vec<String>,
    /// Reproject geometry to this SRID; `None` keeps the stored WKT.
    pub target_srid: Option<i32>,
    pub fetch_size: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { districts: Vec::new(), target_srid: None, fetch_size: DEFAULT_FETCH_SIZE }
    }
}

/// A forward-only stream of parcel records, sorted by district.
pub type ParcelStream<'a> = Box<dyn Iterator<Item = Result<ParcelRecord>> + 'a>;

/// Anything that can open a district-sorted parcel stream.
pub trait ParcelSource {
    fn parcels(&mut self, config: &SourceConfig) -> Result<ParcelStream<'_>>;
}
