use std::collections::HashSet;
use std::mem;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::common::{ensure_dir_exists, sanitize_filename};
use crate::drawing::{DEFAULT_TEXT_HEIGHT, DistrictDocument};
use crate::export::DistrictStats;
use crate::geom::decode;
use crate::io::dxf::{DEFAULT_ENCODINGS, DxfVersion, TextEncoding};
use crate::source::ParcelRecord;

/// How district documents are drawn and where they are written.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub text_height: f64,
    pub dxf_version: DxfVersion,
    /// Tried in order when serialising each document.
    pub encodings: Vec<TextEncoding>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            text_height: DEFAULT_TEXT_HEIGHT,
            dxf_version: DxfVersion::default(),
            encodings: DEFAULT_ENCODINGS.to_vec(),
        }
    }
}

/// One written district file.
#[derive(Debug, Clone)]
pub struct DistrictReport {
    pub district: String,
    pub path: PathBuf,
    pub parcels: usize,
    /// Records of this district whose geometry could not be drawn.
    pub skipped: usize,
    pub encoding: TextEncoding,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Written files, in stream order.
    pub districts: Vec<DistrictReport>,
    /// Records dropped for a null or blank geometry column.
    pub empty_geometry: usize,
    pub elapsed: Duration,
}

impl ExportSummary {
    pub fn total_parcels(&self) -> usize { self.districts.iter().map(|d| d.parcels).sum() }

    pub fn total_skipped(&self) -> usize { self.empty_geometry + self.districts.iter().map(|d| d.skipped).sum::<usize>() }
}

struct ActiveDistrict {
    name: String,
    document: DistrictDocument,
    stats: DistrictStats,
}

#[derive(Default)]
enum DistrictState {
    #[default]
    NoActiveDistrict,
    Active(ActiveDistrict),
}

/// Groups a district-sorted record stream into one drawing per district run.
///
/// At most one document is live at a time; it is written when the district
/// changes and on [`DistrictExporter::end`].
pub struct DistrictExporter<'o> {
    options: &'o ExportOptions,
    state: DistrictState,
    districts: Vec<DistrictReport>,
    file_names: HashSet<String>,
    empty_geometry: usize,
}

impl<'o> DistrictExporter<'o> {
    pub fn new(options: &'o ExportOptions) -> Self {
        Self {
            options,
            state: DistrictState::NoActiveDistrict,
            districts: Vec::new(),
            file_names: HashSet::new(),
            empty_geometry: 0,
        }
    }

    /// Name of the district currently being drawn.
    pub fn active_district(&self) -> Option<&str> {
        match &self.state {
            DistrictState::Active(active) => Some(&active.name),
            DistrictState::NoActiveDistrict => None,
        }
    }

    /// Reports for the districts written so far.
    pub fn finished(&self) -> &[DistrictReport] { &self.districts }

    /// Add one record, switching districts first if its district differs
    /// from the active one. A record with no geometry never switches.
    pub fn push(&mut self, record: ParcelRecord) -> Result<()> {
        if record.has_empty_geometry() {
            warn!("[export] Skipping parcel {}/{} in '{}': empty geometry", record.block, record.parcel, record.district);
            self.empty_geometry += 1;
            return Ok(());
        }

        let mut active = match mem::take(&mut self.state) {
            DistrictState::Active(active) if active.name == record.district => active,
            DistrictState::Active(finished) => {
                self.flush(finished)?;
                self.start(&record.district)
            }
            DistrictState::NoActiveDistrict => self.start(&record.district),
        };

        match decode(record.geometry.as_deref()) {
            Ok(parcel) => {
                for ring in parcel.shape.into_rings() {
                    active.document.add_boundary(ring);
                }
                active.document.add_label(&record.label(), parcel.centroid, self.options.text_height);
                active.stats.record_parcel();
            }
            Err(e) => {
                warn!("[export] Skipping parcel {}/{} in '{}': {e}", record.block, record.parcel, record.district);
                active.stats.record_skip();
            }
        }

        self.state = DistrictState::Active(active);
        Ok(())
    }

    /// Write the live document, if any, and return the run summary.
    pub fn end(mut self) -> Result<ExportSummary> {
        if let DistrictState::Active(active) = mem::take(&mut self.state) {
            self.flush(active)?;
        }
        Ok(ExportSummary { districts: self.districts, empty_geometry: self.empty_geometry, elapsed: Duration::ZERO })
    }

    fn start(&self, name: &str) -> ActiveDistrict {
        info!("[export] Starting district '{name}'");
        ActiveDistrict {
            name: name.to_string(),
            document: DistrictDocument::new(self.options.dxf_version),
            stats: DistrictStats::new(),
        }
    }

    fn flush(&mut self, active: ActiveDistrict) -> Result<()> {
        let ActiveDistrict { name, document, stats } = active;
        let path = self.options.output_dir.join(self.unique_file_name(&name));
        let (boundaries, labels) = (document.boundary_count(), document.label_count());

        let (path, encoding) = document.finalize(&path, &self.options.encodings)
            .with_context(|| format!("[export] Failed to write district '{name}'"))?;

        let elapsed = stats.elapsed();
        info!("[export] Finished district '{name}': {} parcels ({} skipped), {boundaries} boundaries, {labels} labels in {elapsed:.2?} -> {}",
            stats.parcels(), stats.skipped(), path.display());

        self.districts.push(DistrictReport {
            district: name,
            path,
            parcels: stats.parcels(),
            skipped: stats.skipped(),
            encoding,
            elapsed,
        });
        Ok(())
    }

    /// `<stem>.dxf`, or `<stem>_<n>.dxf` when that name was already used in this run.
    fn unique_file_name(&mut self, district: &str) -> String {
        let stem = sanitize_filename(district);
        let mut file_name = format!("{stem}.dxf");
        let mut n = 1;
        while !self.file_names.insert(file_name.clone()) {
            n += 1;
            file_name = format!("{stem}_{n}.dxf");
        }
        file_name
    }
}

/// Export a district-sorted record stream, one DXF per district run.
///
/// The stream is dropped before any error is returned. Files written before a
/// failure are left in place; the district in progress is discarded.
pub fn export<I>(records: I, options: &ExportOptions) -> Result<ExportSummary>
where
    I: IntoIterator<Item = Result<ParcelRecord>>,
{
    let started = Instant::now();
    let result = run(records.into_iter(), options, started);
    match &result {
        Ok(summary) => info!("[export] Exported {} districts ({} parcels) in {:.2?}",
            summary.districts.len(), summary.total_parcels(), started.elapsed()),
        Err(e) => error!("[export] Export failed after {:.2?}: {e:#}", started.elapsed()),
    }
    result
}

fn run(records: impl Iterator<Item = Result<ParcelRecord>>, options: &ExportOptions, started: Instant) -> Result<ExportSummary> {
    ensure_dir_exists(&options.output_dir)?;

    let mut exporter = DistrictExporter::new(options);
    for record in records {
        let record = record.context("[export] Record stream failed")?;
        exporter.push(record)?;
    }

    let mut summary = exporter.end()?;
    summary.elapsed = started.elapsed();
    Ok(summary)
}
