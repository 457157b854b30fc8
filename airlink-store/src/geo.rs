use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use airlink_core::repository::StoreError;

use crate::cache::TtlCache;

fn upstream_err(e: reqwest::Error) -> StoreError {
    StoreError::Upstream(e.to_string())
}

/// Strip anything that is not alphanumeric from a code interpolated
/// into an ArcGIS `where` clause.
fn sanitize_code(code: &str) -> String {
    code.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

fn attr_string(attributes: &Value, key: &str) -> String {
    match attributes.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

// ============================================================================
// Administrative divisions (DPA)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Division {
    pub codigo: String,
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_provincia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_region: Option<String>,
}

#[derive(Deserialize)]
struct ArcGisResponse {
    #[serde(default)]
    features: Vec<ArcGisFeature>,
}

#[derive(Deserialize)]
struct ArcGisFeature {
    attributes: Value,
}

pub struct DpaClient {
    http: reqwest::Client,
    base: String,
    cache: TtlCache<Vec<Division>>,
}

impl DpaClient {
    pub fn new(http: reqwest::Client, base: String, ttl: Duration) -> Self {
        Self {
            http,
            base,
            cache: TtlCache::new(ttl),
        }
    }

    async fn query_layer(
        &self,
        layer: u8,
        where_clause: &str,
        out_fields: &str,
        order_by: &str,
    ) -> Result<Vec<Value>, StoreError> {
        let url = format!("{}/{}/query", self.base, layer);
        let response: ArcGisResponse = self
            .http
            .get(&url)
            .query(&[
                ("f", "json"),
                ("returnGeometry", "false"),
                ("where", where_clause),
                ("outFields", out_fields),
                ("orderByFields", order_by),
            ])
            .send()
            .await
            .map_err(upstream_err)?
            .json()
            .await
            .map_err(upstream_err)?;

        Ok(response.features.into_iter().map(|f| f.attributes).collect())
    }

    pub async fn regions(&self) -> Result<Vec<Division>, StoreError> {
        if let Some(hit) = self.cache.get("regiones").await {
            return Ok(hit);
        }
        let rows = self
            .query_layer(3, "1=1", "CUT_REG,REGION", "CUT_REG")
            .await?;
        let out: Vec<Division> = rows
            .iter()
            .map(|a| Division {
                codigo: attr_string(a, "CUT_REG"),
                nombre: attr_string(a, "REGION"),
                codigo_provincia: None,
                codigo_region: None,
            })
            .collect();
        self.cache.insert("regiones", out.clone()).await;
        Ok(out)
    }

    pub async fn provinces(&self, region_code: &str) -> Result<Vec<Division>, StoreError> {
        let code = sanitize_code(region_code);
        let key = format!("prov:{code}");
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }
        let rows = self
            .query_layer(
                2,
                &format!("CUT_REG='{code}'"),
                "CUT_PROV,PROVINCIA,CUT_REG",
                "PROVINCIA",
            )
            .await?;
        let out: Vec<Division> = rows
            .iter()
            .map(|a| Division {
                codigo: attr_string(a, "CUT_PROV"),
                nombre: attr_string(a, "PROVINCIA"),
                codigo_provincia: None,
                codigo_region: Some(attr_string(a, "CUT_REG")),
            })
            .collect();
        self.cache.insert(key, out.clone()).await;
        Ok(out)
    }

    pub async fn communes(&self, province_code: &str) -> Result<Vec<Division>, StoreError> {
        let code = sanitize_code(province_code);
        let key = format!("com:{code}");
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(hit);
        }
        let rows = self
            .query_layer(
                1,
                &format!("CUT_PROV='{code}'"),
                "CUT_COM,COMUNA,CUT_PROV,CUT_REG",
                "COMUNA",
            )
            .await?;
        let out = Self::map_communes(&rows);
        self.cache.insert(key, out.clone()).await;
        Ok(out)
    }

    pub async fn all_communes(&self) -> Result<Vec<Division>, StoreError> {
        if let Some(hit) = self.cache.get("comunas:all").await {
            return Ok(hit);
        }
        let rows = self
            .query_layer(1, "1=1", "CUT_COM,COMUNA,CUT_PROV,CUT_REG", "COMUNA")
            .await?;
        let out = Self::map_communes(&rows);
        self.cache.insert("comunas:all", out.clone()).await;
        Ok(out)
    }

    fn map_communes(rows: &[Value]) -> Vec<Division> {
        rows.iter()
            .map(|a| Division {
                codigo: attr_string(a, "CUT_COM"),
                nombre: attr_string(a, "COMUNA"),
                codigo_provincia: Some(attr_string(a, "CUT_PROV")),
                codigo_region: Some(attr_string(a, "CUT_REG")),
            })
            .collect()
    }
}

// ============================================================================
// Airport directory (OurAirports dataset)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airport {
    pub id: String,
    pub iata: String,
    pub icao: String,
    pub name: String,
    pub city: String,
    pub country: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Deserialize)]
struct AirportCsvRow {
    ident: String,
    #[serde(rename = "type")]
    kind: String,
    name: String,
    latitude_deg: String,
    longitude_deg: String,
    iso_country: String,
    municipality: String,
    gps_code: String,
    iata_code: String,
    local_code: String,
}

pub struct AirportsClient {
    http: reqwest::Client,
    csv_url: String,
    cache: TtlCache<Arc<Vec<Airport>>>,
}

impl AirportsClient {
    pub fn new(http: reqwest::Client, csv_url: String, ttl: Duration) -> Self {
        Self {
            http,
            csv_url,
            cache: TtlCache::new(ttl),
        }
    }

    /// Large/medium airports with an IATA code, loaded from the dataset
    /// on cache miss.
    async fn load(&self) -> Result<Arc<Vec<Airport>>, StoreError> {
        if let Some(hit) = self.cache.get("airports").await {
            return Ok(hit);
        }

        let body = self
            .http
            .get(&self.csv_url)
            .send()
            .await
            .map_err(upstream_err)?
            .text()
            .await
            .map_err(upstream_err)?;

        let mut airports = Vec::new();
        let mut reader = csv::ReaderBuilder::new().from_reader(body.as_bytes());
        for row in reader.deserialize::<AirportCsvRow>().flatten() {
            let is_airport = row.kind == "large_airport" || row.kind == "medium_airport";
            if !is_airport || row.iata_code.len() != 3 {
                continue;
            }
            let icao = if !row.gps_code.is_empty() { row.gps_code } else { row.local_code };
            airports.push(Airport {
                id: row.ident,
                iata: row.iata_code,
                icao,
                name: row.name,
                city: row.municipality,
                country: row.iso_country,
                kind: row.kind,
                lat: row.latitude_deg.parse().ok(),
                lon: row.longitude_deg.parse().ok(),
            });
        }

        info!(count = airports.len(), "airport dataset loaded");
        let airports = Arc::new(airports);
        self.cache.insert("airports", airports.clone()).await;
        Ok(airports)
    }

    pub async fn search(&self, term: &str, limit: usize) -> Result<Vec<Airport>, StoreError> {
        let airports = self.load().await?;
        let term = term.trim().to_lowercase();

        let mut out = Vec::new();
        for airport in airports.iter() {
            if airport.iata.to_lowercase().contains(&term)
                || airport.name.to_lowercase().contains(&term)
                || airport.city.to_lowercase().contains(&term)
                || airport.country.to_lowercase().contains(&term)
            {
                out.push(airport.clone());
                if out.len() >= limit {
                    break;
                }
            }
        }
        Ok(out)
    }
}

// ============================================================================
// Countries (restcountries v3.1)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub code2: Option<String>,
    pub code3: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "officialName")]
    pub official_name: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub capital: Option<String>,
    pub flag: Option<String>,
    pub population: Option<i64>,
}

#[derive(Deserialize)]
struct RestCountry {
    name: Option<RestCountryName>,
    cca2: Option<String>,
    cca3: Option<String>,
    region: Option<String>,
    subregion: Option<String>,
    capital: Option<Vec<String>>,
    flags: Option<RestCountryFlags>,
    population: Option<i64>,
}

#[derive(Deserialize)]
struct RestCountryName {
    common: Option<String>,
    official: Option<String>,
}

#[derive(Deserialize)]
struct RestCountryFlags {
    svg: Option<String>,
    png: Option<String>,
}

const COUNTRY_FIELDS: &str = "name,cca2,cca3,region,subregion,capital,flags,population";

pub struct CountriesClient {
    http: reqwest::Client,
    base: String,
}

impl CountriesClient {
    pub fn new(http: reqwest::Client, base: String) -> Self {
        Self { http, base }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<Country>, StoreError> {
        let rows: Vec<RestCountry> = self
            .http
            .get(url)
            .send()
            .await
            .map_err(upstream_err)?
            .error_for_status()
            .map_err(upstream_err)?
            .json()
            .await
            .map_err(upstream_err)?;

        Ok(rows
            .into_iter()
            .map(|c| Country {
                code2: c.cca2,
                code3: c.cca3,
                name: c.name.as_ref().and_then(|n| n.common.clone()),
                official_name: c.name.and_then(|n| n.official),
                region: c.region,
                subregion: c.subregion,
                capital: c.capital.and_then(|caps| caps.into_iter().next()),
                flag: c.flags.and_then(|f| f.svg.or(f.png)),
                population: c.population,
            })
            .collect())
    }

    pub async fn list(&self) -> Result<Vec<Country>, StoreError> {
        self.fetch(&format!("{}/all?fields={COUNTRY_FIELDS}", self.base)).await
    }

    pub async fn by_region(&self, region: &str) -> Result<Vec<Country>, StoreError> {
        let region = sanitize_code(region);
        self.fetch(&format!("{}/region/{region}?fields={COUNTRY_FIELDS}", self.base)).await
    }
}

// ============================================================================
// Geocoding (Open-Meteo)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPlace {
    pub id: Option<i64>,
    pub name: String,
    pub country: Option<String>,
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub population: Option<i64>,
    pub label: String,
}

#[derive(Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Deserialize)]
struct GeocodingResult {
    id: Option<i64>,
    name: String,
    country: Option<String>,
    admin1: Option<String>,
    latitude: f64,
    longitude: f64,
    timezone: Option<String>,
    population: Option<i64>,
}

pub struct GeocodingClient {
    http: reqwest::Client,
    base: String,
}

impl GeocodingClient {
    pub fn new(http: reqwest::Client, base: String) -> Self {
        Self { http, base }
    }

    pub async fn search(
        &self,
        name: &str,
        count: u32,
        language: &str,
    ) -> Result<Vec<GeoPlace>, StoreError> {
        let url = format!("{}/search", self.base);
        let response: GeocodingResponse = self
            .http
            .get(&url)
            .query(&[
                ("name", name),
                ("count", &count.to_string()),
                ("language", language),
            ])
            .send()
            .await
            .map_err(upstream_err)?
            .error_for_status()
            .map_err(upstream_err)?
            .json()
            .await
            .map_err(upstream_err)?;

        Ok(response
            .results
            .into_iter()
            .map(|r| {
                let label = [Some(r.name.as_str()), r.admin1.as_deref(), r.country.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(", ");
                GeoPlace {
                    id: r.id,
                    name: r.name,
                    country: r.country,
                    admin1: r.admin1,
                    latitude: r.latitude,
                    longitude: r.longitude,
                    timezone: r.timezone,
                    population: r.population,
                    label,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arcgis_attributes_accept_numbers_and_strings() {
        let attrs = serde_json::json!({"CUT_REG": 13, "REGION": "Metropolitana"});
        assert_eq!(attr_string(&attrs, "CUT_REG"), "13");
        assert_eq!(attr_string(&attrs, "REGION"), "Metropolitana");
        assert_eq!(attr_string(&attrs, "MISSING"), "");
    }

    #[test]
    fn where_clause_codes_are_sanitized() {
        assert_eq!(sanitize_code("13"), "13");
        assert_eq!(sanitize_code("13' OR '1'='1"), "13OR11");
    }
}
