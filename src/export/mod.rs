mod exporter;
mod stats;

pub use exporter::{DistrictExporter, DistrictReport, ExportOptions, ExportSummary, export};
pub use stats::DistrictStats;
