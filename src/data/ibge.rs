//! IBGE SIDRA API integration for the IPCA monthly variation series.
//!
//! Aggregate 1737 (IPCA), variable 63 (monthly variation, %), national level.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::domain::{MonthlySeries, Observation, format_year_month, parse_year_month};
use crate::error::AppError;

pub const DEFAULT_API_BASE: &str = "https://servicodados.ibge.gov.br/api/v3";

const AGGREGATE_ID: u32 = 1737;
const VARIABLE_ID: u32 = 63;
const LOCALITIES: &str = "N1[all]";

/// Environment variable that overrides [`DEFAULT_API_BASE`].
pub const API_BASE_ENV: &str = "IPCA_API_BASE";

pub struct IbgeClient {
    client: Client,
    base: String,
}

impl IbgeClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the request URL for the inclusive `[start, end]` month range.
    pub fn series_url(&self, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/agregados/{AGGREGATE_ID}/periodos/{}-{}/variaveis/{VARIABLE_ID}?localidades={LOCALITIES}",
            self.base,
            format_year_month(start),
            format_year_month(end),
        )
    }

    /// Fetch and parse the series. A single attempt; no retry.
    pub fn fetch_series(&self, start: NaiveDate, end: NaiveDate) -> Result<MonthlySeries, AppError> {
        let url = self.series_url(start, end);
        info!(%url, "fetching IPCA series");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::network(format!("IBGE request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::network(format!(
                "IBGE request failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::network(format!("Failed to read IBGE response: {e}")))?;
        debug!(bytes = body.len(), "IBGE response received");

        let series = parse_payload(&body)?;
        info!(
            n = series.len(),
            first = ?series.first().map(|o| o.date),
            last = ?series.last().map(|o| o.date),
            "parsed IPCA series"
        );
        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
struct Aggregate {
    resultados: Vec<Resultado>,
}

#[derive(Debug, Deserialize)]
struct Resultado {
    series: Vec<SeriesEntry>,
}

#[derive(Debug, Deserialize)]
struct SeriesEntry {
    #[serde(deserialize_with = "unique_periods")]
    serie: BTreeMap<String, String>,
}

/// Deserialize the `serie` object, rejecting repeated period keys instead of
/// letting the last one win.
fn unique_periods<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PeriodsVisitor;

    impl<'de> Visitor<'de> for PeriodsVisitor {
        type Value = BTreeMap<String, String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object mapping YYYYMM periods to values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut out = BTreeMap::new();
            while let Some((key, value)) = map.next_entry::<String, String>()? {
                match out.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert(value);
                    }
                    Entry::Occupied(slot) => {
                        return Err(de::Error::custom(format!("duplicate period '{}'", slot.key())));
                    }
                }
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(PeriodsVisitor)
}

/// Parse a raw API payload into a validated monthly series.
///
/// Any shape or value problem fails the whole parse; nothing partial is
/// returned.
pub fn parse_payload(body: &str) -> Result<MonthlySeries, AppError> {
    let aggregates: Vec<Aggregate> = serde_json::from_str(body)
        .map_err(|e| AppError::data_format(format!("Failed to parse IBGE response: {e}")))?;

    let serie = aggregates
        .into_iter()
        .next()
        .ok_or_else(|| AppError::data_format("IBGE response contains no aggregates."))?
        .resultados
        .into_iter()
        .next()
        .ok_or_else(|| AppError::data_format("IBGE response has no 'resultados'."))?
        .series
        .into_iter()
        .next()
        .ok_or_else(|| AppError::data_format("IBGE response has no 'series'."))?
        .serie;

    if serie.is_empty() {
        return Err(AppError::data_format("IBGE series is empty."));
    }

    // `YYYYMM` keys sort chronologically, so the map order is the series order.
    let mut out = Vec::with_capacity(serie.len());
    for (key, raw) in serie {
        let date = parse_year_month(&key)
            .ok_or_else(|| AppError::data_format(format!("Invalid IBGE period '{key}'.")))?;
        let value = parse_value(&raw).ok_or_else(|| {
            AppError::data_format(format!("Non-numeric IBGE value '{raw}' for period {key}."))
        })?;
        out.push(Observation::new(date, value));
    }

    MonthlySeries::new(out)
}

fn parse_value(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
