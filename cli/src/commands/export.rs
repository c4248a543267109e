use anyhow::Result;
use log::{debug, info};
use parcel_dxf::{ConnectionConfig, ExportOptions, ParcelSource, PostgresSource, SourceConfig, export};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ExportArgs) -> Result<()> {
    let connection = ConnectionConfig {
        host: args.db_host.clone(),
        port: args.db_port,
        user: args.db_user.clone(),
        password: args.db_password.clone(),
        dbname: args.db_name.clone(),
    };
    let source_config = SourceConfig {
        districts: args.districts.clone(),
        target_srid: args.srid,
        fetch_size: args.fetch_size,
    };
    let options = ExportOptions {
        output_dir: args.output.clone(),
        text_height: args.text_height,
        dxf_version: args.dxf_version,
        encodings: args.encodings.iter().map(|&e| e.into()).collect(),
    };

    debug!("[export] {source_config:?}");
    debug!("[export] {options:?}");

    let mut source = PostgresSource::connect(&connection)?;
    let summary = export(source.parcels(&source_config)?, &options)?;

    info!("[export] Wrote {} files to {}", summary.districts.len(), options.output_dir.display());
    Ok(())
}
