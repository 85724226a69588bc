// # Gandi Zone Editor
//
// This crate provides a ZoneEditor backed by the Gandi XML-RPC zone API.
//
// ## Implementation
//
// - ✅ One HTTP request per trait call, no retries (the next scheduled run starts over)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ XML-RPC faults surfaced as `Error::Rpc`
// - ✅ HTTP status codes mapped (401/403, 429, 5xx)
// - ❌ NO zone or version creation (versions must be provisioned beforehand)
//
// ## Security Requirements
//
// - API key NEVER appears in logs or Debug output
// - TLS verification is configurable and a warning is logged while it is off
//
// ## API Reference
//
// All methods take the API key as their first parameter.
//
// - `domain.zone.list(key)` -> `[{id, name, version, ...}]`
// - `domain.zone.record.list(key, zone_id, version)` -> `[{id, name, type, value, ttl}]`
// - `domain.zone.record.add(key, zone_id, version, {name, type, value, ttl})` -> `{id, ...}`
// - `domain.zone.record.delete(key, zone_id, version, {id})` -> count
// - `domain.zone.version.set(key, zone_id, version)` -> boolean

pub mod xmlrpc;

use async_trait::async_trait;
use seedsync_core::config::ZoneEditorConfig;
use seedsync_core::traits::{NewRecord, ZoneEditor, ZoneEditorFactory, ZoneRecord, ZoneSummary};
use seedsync_core::{Error, Registry, Result};
use std::time::Duration;
use xmlrpc::Value;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Method prefix of the zone sub-API
const ZONE_PREFIX: &str = "domain.zone.";

/// Method prefix of the record sub-API
const RECORD_PREFIX: &str = "domain.zone.record.";

/// Method prefix of the version sub-API
const VERSION_PREFIX: &str = "domain.zone.version.";

/// Gandi zone editor
///
/// # Security
///
/// The Debug implementation does NOT expose the API key.
pub struct GandiZoneEditor {
    /// Gandi API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// XML-RPC endpoint
    api_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Whether the endpoint's TLS certificate is verified
    verify_tls: bool,
}

impl std::fmt::Debug for GandiZoneEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GandiZoneEditor")
            .field("api_key", &"<REDACTED>")
            .field("api_url", &self.api_url)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

impl GandiZoneEditor {
    /// Create a new Gandi zone editor
    ///
    /// # Parameters
    ///
    /// - `api_key`: Gandi XML-RPC API key
    /// - `api_url`: XML-RPC endpoint (e.g., "https://rpc.gandi.net/xmlrpc/")
    /// - `verify_tls`: Whether to verify the endpoint's certificate
    pub fn new(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        verify_tls: bool,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("Gandi API key cannot be empty"));
        }

        let api_url = api_url.into();
        if !verify_tls {
            tracing::warn!(
                "TLS certificate verification is disabled for {}",
                api_url
            );
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_url,
            client,
            verify_tls,
        })
    }

    /// Zone sub-API (`domain.zone.`)
    pub fn zones(&self) -> ZoneApi<'_> {
        ZoneApi { editor: self }
    }

    /// Record sub-API (`domain.zone.record.`)
    pub fn records(&self) -> RecordApi<'_> {
        RecordApi { editor: self }
    }

    /// Version sub-API (`domain.zone.version.`)
    pub fn versions(&self) -> VersionApi<'_> {
        VersionApi { editor: self }
    }

    /// Perform one XML-RPC call
    ///
    /// The API key is prepended to `params`.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        tracing::debug!("Calling {}", method);

        let mut all_params = Vec::with_capacity(params.len() + 1);
        all_params.push(Value::String(self.api_key.clone()));
        all_params.extend(params);

        let body = xmlrpc::encode_call(method, &all_params)?;

        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", method, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return match status.as_u16() {
                401 | 403 => Err(Error::auth(format!(
                    "Gandi rejected the API key. Status: {}",
                    status
                ))),
                429 => Err(Error::rate_limited(format!(
                    "Gandi rate limit exceeded. Status: {}",
                    status
                ))),
                500..=599 => Err(Error::provider(
                    "gandi",
                    format!("Gandi server error (transient): {}", status),
                )),
                _ => Err(Error::provider(
                    "gandi",
                    format!("{} failed: HTTP {}", method, status),
                )),
            };
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read {} response: {}", method, e)))?;

        xmlrpc::decode_response(&text)
    }
}

/// Zone sub-API
pub struct ZoneApi<'a> {
    editor: &'a GandiZoneEditor,
}

impl ZoneApi<'_> {
    /// `domain.zone.list`
    pub async fn list(&self) -> Result<Vec<ZoneSummary>> {
        let value = self
            .editor
            .call(&format!("{}list", ZONE_PREFIX), Vec::new())
            .await?;

        array(&value, "domain.zone.list")?
            .iter()
            .map(|zone| {
                Ok(ZoneSummary {
                    id: int_member(zone, "id")?,
                    version: version_member(zone, "version")?,
                })
            })
            .collect()
    }
}

/// Record sub-API
pub struct RecordApi<'a> {
    editor: &'a GandiZoneEditor,
}

impl RecordApi<'_> {
    /// `domain.zone.record.list`
    pub async fn list(&self, zone_id: i64, version: u32) -> Result<Vec<ZoneRecord>> {
        let value = self
            .editor
            .call(
                &format!("{}list", RECORD_PREFIX),
                vec![Value::Int(zone_id), Value::from(version)],
            )
            .await?;

        array(&value, "domain.zone.record.list")?
            .iter()
            .map(|record| {
                Ok(ZoneRecord {
                    id: int_member(record, "id")?,
                    name: str_member(record, "name")?,
                    record_type: str_member(record, "type")?,
                    value: str_member(record, "value")?,
                    ttl: u32::try_from(int_member(record, "ttl")?)
                        .map_err(|_| Error::decode("Record ttl out of range"))?,
                })
            })
            .collect()
    }

    /// `domain.zone.record.add`
    ///
    /// # Returns
    ///
    /// The id of the created record
    pub async fn add(&self, zone_id: i64, version: u32, record: &NewRecord) -> Result<i64> {
        let fields = Value::structure([
            ("name", Value::from(record.name.as_str())),
            ("type", Value::from(record.record_type.as_str())),
            ("value", Value::from(record.value.as_str())),
            ("ttl", Value::from(record.ttl)),
        ]);

        let value = self
            .editor
            .call(
                &format!("{}add", RECORD_PREFIX),
                vec![Value::Int(zone_id), Value::from(version), fields],
            )
            .await?;

        match &value {
            Value::Int(id) => Ok(*id),
            Value::Struct(_) => int_member(&value, "id"),
            other => Err(Error::decode(format!(
                "domain.zone.record.add returned {:?}",
                other
            ))),
        }
    }

    /// `domain.zone.record.delete`
    pub async fn delete(&self, zone_id: i64, version: u32, record_id: i64) -> Result<()> {
        let value = self
            .editor
            .call(
                &format!("{}delete", RECORD_PREFIX),
                vec![
                    Value::Int(zone_id),
                    Value::from(version),
                    Value::structure([("id", Value::Int(record_id))]),
                ],
            )
            .await?;

        ack(&value, "domain.zone.record.delete")
    }
}

/// Version sub-API
pub struct VersionApi<'a> {
    editor: &'a GandiZoneEditor,
}

impl VersionApi<'_> {
    /// `domain.zone.version.set`
    pub async fn set(&self, zone_id: i64, version: u32) -> Result<()> {
        let value = self
            .editor
            .call(
                &format!("{}set", VERSION_PREFIX),
                vec![Value::Int(zone_id), Value::from(version)],
            )
            .await?;

        ack(&value, "domain.zone.version.set")
    }
}

fn array<'v>(value: &'v Value, method: &str) -> Result<&'v [Value]> {
    value
        .as_array()
        .ok_or_else(|| Error::decode(format!("{} did not return an array", method)))
}

fn int_member(value: &Value, key: &str) -> Result<i64> {
    value
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::decode(format!("Missing integer member '{}'", key)))
}

fn version_member(value: &Value, key: &str) -> Result<u32> {
    u32::try_from(int_member(value, key)?)
        .map_err(|_| Error::decode(format!("Member '{}' is not a zone version", key)))
}

fn str_member(value: &Value, key: &str) -> Result<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::decode(format!("Missing string member '{}'", key)))
}

/// Any non-fault answer acknowledges, except an explicit `false`
fn ack(value: &Value, method: &str) -> Result<()> {
    match value {
        Value::Bool(false) => Err(Error::zone_editor(format!(
            "{} was not acknowledged",
            method
        ))),
        _ => Ok(()),
    }
}

#[async_trait]
impl ZoneEditor for GandiZoneEditor {
    async fn list_zones(&self) -> Result<Vec<ZoneSummary>> {
        self.zones().list().await
    }

    async fn list_records(&self, zone_id: i64, version: u32) -> Result<Vec<ZoneRecord>> {
        self.records().list(zone_id, version).await
    }

    async fn add_record(&self, zone_id: i64, version: u32, record: &NewRecord) -> Result<i64> {
        self.records().add(zone_id, version, record).await
    }

    async fn delete_record(&self, zone_id: i64, version: u32, record_id: i64) -> Result<()> {
        self.records().delete(zone_id, version, record_id).await
    }

    async fn activate_version(&self, zone_id: i64, version: u32) -> Result<()> {
        self.versions().set(zone_id, version).await
    }

    fn provider_name(&self) -> &'static str {
        "gandi"
    }
}

/// Factory for creating Gandi zone editors
pub struct GandiFactory;

impl ZoneEditorFactory for GandiFactory {
    fn create(&self, config: &ZoneEditorConfig) -> Result<Box<dyn ZoneEditor>> {
        match config {
            ZoneEditorConfig::Gandi {
                api_key,
                api_url,
                verify_tls,
            } => {
                if api_key.is_empty() {
                    return Err(Error::config("Gandi API key is required"));
                }
                Ok(Box::new(GandiZoneEditor::new(
                    api_key.clone(),
                    api_url.clone(),
                    *verify_tls,
                )?))
            }
            _ => Err(Error::config("Invalid config for Gandi zone editor")),
        }
    }
}

/// Register the Gandi zone editor with a registry
pub fn register(registry: &mut Registry) {
    registry.register_zone_editor("gandi", Box::new(GandiFactory));
}
