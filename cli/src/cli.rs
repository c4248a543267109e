use std::path::PathBuf;

use parcel_dxf::{DxfVersion, TextEncoding};

/// Parcel-to-DXF exporter (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "parcel-dxf", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Export one DXF drawing per district from a PostGIS parcel table
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = "")]
    pub db_name: String,

    /// Output directory, defaults to "./outputs"
    #[arg(short, long, env = "OUTPUT_DIR", default_value = "./outputs", value_hint = clap::ValueHint::DirPath)]
    pub output: PathBuf,

    /// Only export these districts (repeatable or comma separated); all when omitted
    #[arg(long = "district", env = "EXPORT_DISTRICTS", value_delimiter = ',')]
    pub districts: Vec<String>,

    /// Reproject geometry to this SRID instead of using the stored WKT
    #[arg(long, env = "TARGET_SRID")]
    pub srid: Option<i32>,

    /// Label text height in drawing units
    #[arg(long, env = "TEXT_HEIGHT", default_value_t = parcel_dxf::DEFAULT_TEXT_HEIGHT)]
    pub text_height: f64,

    /// Rows fetched per database round trip
    #[arg(long, env = "FETCH_SIZE", default_value_t = parcel_dxf::DEFAULT_FETCH_SIZE)]
    pub fetch_size: usize,

    /// DXF release to write (R12 or R2000; AC1009 and AC1015 also accepted)
    #[arg(long, env = "DXF_VERSION", default_value = "R2000")]
    pub dxf_version: DxfVersion,

    /// Text encodings to try, in order
    #[arg(long = "encoding", env = "DXF_ENCODINGS", value_enum, value_delimiter = ',',
          default_values_t = [EncodingArg::Cp1254, EncodingArg::Cp1252, EncodingArg::Ascii])]
    pub encodings: Vec<EncodingArg>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, clap::ValueEnum)]
pub enum EncodingArg { Cp1254, Cp1252, Ascii }

impl From<EncodingArg> for TextEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Cp1254 => TextEncoding::Windows1254,
            EncodingArg::Cp1252 => TextEncoding::Windows1252,
            EncodingArg::Ascii => TextEncoding::AsciiEscaped,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["parcel-dxf", "export"]).unwrap();
        let Commands::Export(args) = cli.command;
        assert_eq!(args.output, PathBuf::from("./outputs"));
        assert_eq!(args.dxf_version, DxfVersion::R2000);
        assert_eq!(args.encodings, vec![EncodingArg::Cp1254, EncodingArg::Cp1252, EncodingArg::Ascii]);
        assert!(args.srid.is_none());
    }

    #[test]
    fn districts_split_on_commas() {
        let cli = Cli::try_parse_from([
            "parcel-dxf", "-vv", "export", "--district", "Çankaya,Mamak", "--district", "Sincan",
            "--dxf-version", "r12", "--srid", "5254",
        ]).unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Export(args) = cli.command;
        assert_eq!(args.districts, vec!["Çankaya", "Mamak", "Sincan"]);
        assert_eq!(args.dxf_version, DxfVersion::R12);
        assert_eq!(args.srid, Some(5254));
    }

    #[test]
    fn dxf_version_accepts_release_codes() {
        let cli = Cli::try_parse_from(["parcel-dxf", "export", "--dxf-version", "AC1009"]).unwrap();
        let Commands::Export(args) = cli.command;
        assert_eq!(args.dxf_version, DxfVersion::R12);

        assert!(Cli::try_parse_from(["parcel-dxf", "export", "--dxf-version", "R14"]).is_err());
    }
}
