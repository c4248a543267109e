//! PostgreSQL/PostGIS parcel source, read through a server-side portal.

use std::collections::VecDeque;

use ::postgres::types::ToSql;
use ::postgres::{Client, Config, NoTls, Portal, Row, Transaction};
use anyhow::{Context, Result};
use log::{debug, info};

use crate::source::{ParcelRecord, ParcelSource, ParcelStream, SourceConfig};

/// Connection parameters.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5432,
            user: String::new(),
            password: String::new(),
            dbname: String::new(),
        }
    }
}

/// Build the parcel query. Parameter `$1` (a `text[]` of district names) is
/// present only when `config.districts` is non-empty.
pub fn build_query(config: &SourceConfig) -> String {
    let geometry = match config.target_srid {
        Some(srid) => format!("ST_AsText(ST_Transform(p.geom, {srid}))"),
        None => "p.orjinalgeomwkt".to_string(),
    };
    let filter = if config.districts.is_empty() { "" } else { "\n  AND i.ad = ANY($1)" };

    format!(
"SELECT
    i.ad::text AS district,
    m.tapumahallead::text AS sub_district,
    p.adano::text AS block,
    p.parselno::text AS parcel,
    {geometry}::text AS geometry
FROM public.tk_parsel p
INNER JOIN public.tk_mahalle m ON m.tapukimlikno = p.tapumahalleref
INNER JOIN public.tk_ilce i ON i.fid = m.ilceref
WHERE p.durum <> '2'{filter}
ORDER BY i.ad")
}

pub struct PostgresSource {
    client: Client,
}

impl PostgresSource {
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        info!("[source::postgres] Connecting to {}@{}:{}/{}", config.user, config.host, config.port, config.dbname);
        let client = Config::new()
            .host(&config.host)
            .port(config.port)
            .user(&config.user)
            .password(&config.password)
            .dbname(&config.dbname)
            .connect(NoTls)
            .with_context(|| format!("[source::postgres] Failed to connect to {}:{}", config.host, config.port))?;
        Ok(Self { client })
    }
}

impl ParcelSource for PostgresSource {
    fn parcels(&mut self, config: &SourceConfig) -> Result<ParcelStream<'_>> {
        let query = build_query(config);
        debug!("[source::postgres] {query}");

        let mut transaction = self.client.build_transaction()
            .read_only(true)
            .start()
            .context("[source::postgres] Failed to open transaction")?;

        let districts = &config.districts;
        let params: Vec<&(dyn ToSql + Sync)> = if districts.is_empty() { vec![] } else { vec![districts as &(dyn ToSql + Sync)] };
        let portal = transaction.bind(query.as_str(), &params)
            .context("[source::postgres] Failed to open parcel cursor")?;

        Ok(Box::new(PortalRows {
            transaction,
            portal,
            buffer: VecDeque::new(),
            fetch_size: i32::try_from(config.fetch_size.max(1)).unwrap_or(i32::MAX),
            exhausted: false,
        }))
    }
}

/// Rows pulled from a portal `fetch_size` at a time. Dropping it rolls back
/// the read-only transaction and closes the cursor.
struct PortalRows<'a> {
    portal: Portal,
    buffer: VecDeque<Row>,
    transaction: Transaction<'a>,
    fetch_size: i32,
    exhausted: bool,
}

impl Iterator for PortalRows<'_> {
    type Item = Result<ParcelRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.pop_front() { return Some(record_from_row(&row)) }
            if self.exhausted { return None }

            match self.transaction.query_portal(&self.portal, self.fetch_size) {
                Ok(rows) => {
                    self.exhausted = rows.len() < self.fetch_size as usize;
                    self.buffer.extend(rows);
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e).context("[source::postgres] Failed to fetch parcel rows"));
                }
            }
        }
    }
}

fn record_from_row(row: &Row) -> Result<ParcelRecord> {
    let text = |idx: usize| -> Result<String> {
        Ok(row.try_get::<_, Option<String>>(idx)
            .with_context(|| format!("[source::postgres] Failed to read column {idx}"))?
            .unwrap_or_default())
    };

    Ok(ParcelRecord {
        district: text(0)?,
        sub_district: text(1)?,
        block: text(2)?,
        parcel: text(3)?,
        geometry: row.try_get(4).context("[source::postgres] Failed to read geometry column")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_reads_stored_wkt_by_default() {
        let query = build_query(&SourceConfig::default());
        assert!(query.contains("p.orjinalgeomwkt"));
        assert!(!query.contains("ST_Transform"));
        assert!(!query.contains("$1"));
        assert!(query.contains("WHERE p.durum <> '2'"));
        assert!(query.trim_end().ends_with("ORDER BY i.ad"));
    }

    #[test]
    fn query_reprojects_and_filters_when_configured() {
        let config = SourceConfig {
            districts: vec!["Çankaya".into()],
            target_srid: Some(5254),
            ..SourceConfig::default()
        };
        let query = build_query(&config);
        assert!(query.contains("ST_AsText(ST_Transform(p.geom, 5254))"));
        assert!(query.contains("AND i.ad = ANY($1)"));
    }

    #[test]
    fn default_connection_targets_localhost() {
        let config = ConnectionConfig::default();
        assert_eq!((config.host.as_str(), config.port), ("localhost", 5432));
    }
}
