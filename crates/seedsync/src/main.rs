// # seedsync - DNS seed record refresher
//
// This binary is a THIN integration layer. All synchronization logic lives
// in seedsync-core; this file only:
// 1. Reads configuration from a JSON file or environment variables
// 2. Initializes logging and the runtime
// 3. Registers the built-in peer source and zone editor
// 4. Runs one synchronization and maps the outcome to an exit code
//
// It is meant to be started by a scheduler (cron, systemd timer) every few
// minutes. A failed run changes nothing live; the next invocation retries.
//
// ## Configuration
//
// `SEEDSYNC_CONFIG` points to a JSON file holding either a single
// `SeedSyncConfig` or a `{ "zones": { "<name>": SeedSyncConfig, ... } }`
// map of independent zones. Without it, configuration comes from
// environment variables and describes one zone:
//
// ### Peer Source
// - `SEEDSYNC_NODE_RPC_URL`: monerod JSON-RPC endpoint
// - `SEEDSYNC_P2P_PORT`: Port a peer must use to become a seed (default 18080)
// - `SEEDSYNC_REQUIRE_NORMAL_STATE`: Only accept established connections (true/false)
// - `SEEDSYNC_CHECK_REACHABILITY`: Only publish peers accepting a TCP connection (true/false)
// - `SEEDSYNC_CONNECT_TIMEOUT_MS`: Timeout of that connection attempt (default 1000)
//
// ### Zone Editor
// - `SEEDSYNC_GANDI_API_KEY`: Gandi API key (required)
// - `SEEDSYNC_GANDI_API_URL`: XML-RPC endpoint
// - `SEEDSYNC_GANDI_VERIFY_TLS`: Verify the endpoint's certificate (default false)
//
// ### Zone
// - `SEEDSYNC_ZONE_ID`: Numeric zone id (required)
// - `SEEDSYNC_RECORD_NAME`: Seed record name (default seeds)
// - `SEEDSYNC_RECORD_TTL`: Seed record TTL (default 300)
// - `SEEDSYNC_ZONE_VERSIONS`: The alternated version pair (default 3,4)
//
// ### Run
// - `SEEDSYNC_LOCK_PATH`: Lock file guarding against overlapping runs
// - `SEEDSYNC_ZONE`: Zone name to refresh from a multi-zone file, or `all` (default all)
// - `SEEDSYNC_MODE`: `dry-run` to plan without editing the zone (also applies with SEEDSYNC_CONFIG)
// - `SEEDSYNC_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export SEEDSYNC_GANDI_API_KEY=your_key
// export SEEDSYNC_ZONE_ID=1234567
// export SEEDSYNC_LOCK_PATH=/run/seedsync.lock
//
// seedsync
// ```

use anyhow::{Context, Result};
use seedsync_core::config::{PeerSourceConfig, ZoneEditorConfig};
use seedsync_core::{
    Error, MultiZoneConfig, Registry, RunLock, SeedSync, SeedSyncConfig, SyncFailure,
    ZoneSelector,
};
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the outcome of one run
///
/// A scheduler can tell "try again later" (2) from "needs an operator" (1, 3).
/// Rejected credentials count as a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeedSyncExitCode {
    /// Zone updated and activated, or dry-run completed
    Success = 0,
    /// Configuration or startup error
    ConfigError = 1,
    /// Network, provider or RPC failure; the next run may succeed
    TransientFailure = 2,
    /// Zone missing, unexpected active version or malformed response
    ZoneStateFailure = 3,
    /// Another run holds the lock file
    Locked = 4,
}

impl From<SeedSyncExitCode> for ExitCode {
    fn from(code: SeedSyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl SeedSyncExitCode {
    /// Rank used to pick one exit code for several zones
    fn severity(self) -> u8 {
        match self {
            SeedSyncExitCode::Success => 0,
            SeedSyncExitCode::Locked => 1,
            SeedSyncExitCode::TransientFailure => 2,
            SeedSyncExitCode::ZoneStateFailure => 3,
            SeedSyncExitCode::ConfigError => 4,
        }
    }

    fn worst(self, other: Self) -> Self {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

impl From<&SyncFailure> for SeedSyncExitCode {
    fn from(failure: &SyncFailure) -> Self {
        match failure.source {
            Error::Authentication(_) | Error::Config(_) => SeedSyncExitCode::ConfigError,
            _ if failure.is_transient() => SeedSyncExitCode::TransientFailure,
            _ => SeedSyncExitCode::ZoneStateFailure,
        }
    }
}

/// Binary settings around the core configuration
struct Settings {
    zones: MultiZoneConfig,
    selector: ZoneSelector,
    log_level: Level,
}

impl Settings {
    /// Load settings from the process environment
    fn from_env() -> Result<Self> {
        Self::load(|key| env::var(key).ok())
    }

    /// Load settings through a variable lookup
    fn load(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut zones = match var("SEEDSYNC_CONFIG") {
            Some(path) => config_from_file(&path)?,
            None => MultiZoneConfig::single(DEFAULT_ZONE_NAME, config_from_vars(&var)?),
        };

        if let Some(mode) = var("SEEDSYNC_MODE") {
            match mode.as_str() {
                "dry-run" => {
                    for config in zones.zones.values_mut() {
                        config.run.dry_run = true;
                    }
                }
                "live" => {}
                _ => anyhow::bail!(
                    "SEEDSYNC_MODE '{}' is not valid. Valid modes: dry-run, live",
                    mode
                ),
            }
        }

        let selector = match var("SEEDSYNC_ZONE") {
            Some(raw) => raw.parse::<ZoneSelector>()?,
            None => ZoneSelector::All,
        };

        let log_level =
            parse_log_level(&var("SEEDSYNC_LOG_LEVEL").unwrap_or_else(|| "info".into()))?;

        zones.validate()?;
        zones.select(&selector)?;

        Ok(Self {
            zones,
            selector,
            log_level,
        })
    }
}

/// Name of the only zone when configuration is not a zone map
const DEFAULT_ZONE_NAME: &str = "default";

/// A file holding either a zone map or a single zone configuration
fn config_from_file(path: &str) -> Result<MultiZoneConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read SEEDSYNC_CONFIG file {}", path))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse SEEDSYNC_CONFIG file {}", path))?;

    if value.get("zones").is_some() {
        serde_json::from_value(value)
            .with_context(|| format!("Failed to parse zone map in SEEDSYNC_CONFIG file {}", path))
    } else {
        let config: SeedSyncConfig = serde_json::from_value(value)
            .with_context(|| format!("Failed to parse SEEDSYNC_CONFIG file {}", path))?;
        Ok(MultiZoneConfig::single(DEFAULT_ZONE_NAME, config))
    }
}

fn config_from_vars(var: &impl Fn(&str) -> Option<String>) -> Result<SeedSyncConfig> {
    let api_key = var("SEEDSYNC_GANDI_API_KEY").context(
        "SEEDSYNC_GANDI_API_KEY is required. Set it via: export SEEDSYNC_GANDI_API_KEY=your_key",
    )?;
    let zone_id: i64 = parse_var(var, "SEEDSYNC_ZONE_ID")?
        .context("SEEDSYNC_ZONE_ID is required. Set it via: export SEEDSYNC_ZONE_ID=1234567")?;

    let mut zone_editor = ZoneEditorConfig::gandi(api_key);
    if let ZoneEditorConfig::Gandi {
        api_url,
        verify_tls,
        ..
    } = &mut zone_editor
    {
        if let Some(url) = var("SEEDSYNC_GANDI_API_URL") {
            *api_url = url;
        }
        if let Some(verify) = parse_bool(var, "SEEDSYNC_GANDI_VERIFY_TLS")? {
            *verify_tls = verify;
        }
    }

    let mut config = SeedSyncConfig::new(zone_editor, zone_id);

    if let Some(rpc_url) = var("SEEDSYNC_NODE_RPC_URL") {
        config.peer_source = PeerSourceConfig::Monerod { rpc_url };
    }
    if let Some(port) = parse_var(var, "SEEDSYNC_P2P_PORT")? {
        config.filter.p2p_port = port;
    }
    if let Some(required) = parse_bool(var, "SEEDSYNC_REQUIRE_NORMAL_STATE")? {
        config.filter.require_normal_state = required;
    }
    if let Some(check) = parse_bool(var, "SEEDSYNC_CHECK_REACHABILITY")? {
        config.filter.check_reachability = check;
    }
    if let Some(timeout) = parse_var(var, "SEEDSYNC_CONNECT_TIMEOUT_MS")? {
        config.filter.connect_timeout_ms = timeout;
    }

    if let Some(name) = var("SEEDSYNC_RECORD_NAME") {
        config.zone.record_name = name;
    }
    if let Some(ttl) = parse_var(var, "SEEDSYNC_RECORD_TTL")? {
        config.zone.ttl = ttl;
    }
    if let Some(versions) = var("SEEDSYNC_ZONE_VERSIONS") {
        config.zone.versions = parse_versions(&versions)?;
    }

    config.run.lock_path = var("SEEDSYNC_LOCK_PATH").filter(|p| !p.is_empty());

    Ok(config)
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} '{}' is not valid: {}", key, raw, e)),
        None => Ok(None),
    }
}

fn parse_bool(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>> {
    match var(key).as_deref().map(str::trim) {
        None => Ok(None),
        Some("1" | "true" | "yes") => Ok(Some(true)),
        Some("0" | "false" | "no") => Ok(Some(false)),
        Some(other) => anyhow::bail!("{} '{}' is not a boolean", key, other),
    }
}

fn parse_versions(raw: &str) -> Result<[u32; 2]> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [first, second] => Ok([
            first
                .parse()
                .with_context(|| format!("SEEDSYNC_ZONE_VERSIONS '{}' is not valid", raw))?,
            second
                .parse()
                .with_context(|| format!("SEEDSYNC_ZONE_VERSIONS '{}' is not valid", raw))?,
        ]),
        _ => anyhow::bail!(
            "SEEDSYNC_ZONE_VERSIONS must hold exactly two versions (e.g. 3,4). Got: {}",
            raw
        ),
    }
}

fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "SEEDSYNC_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            raw
        ),
    }
}

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SeedSyncExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SeedSyncExitCode::ConfigError.into();
    }

    // Calls are strictly sequential; one thread is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SeedSyncExitCode::ConfigError.into();
        }
    };

    rt.block_on(run(&settings.zones, &settings.selector)).into()
}

fn build_registry() -> Registry {
    #[allow(unused_mut)]
    let mut registry = Registry::new();

    #[cfg(feature = "monerod")]
    seedsync_peer_monerod::register(&mut registry);

    #[cfg(feature = "gandi")]
    seedsync_zone_gandi::register(&mut registry);

    registry
}

/// Run the selected zones one after another
///
/// A failing zone does not stop the others. The exit code is the most severe
/// outcome of all zones.
async fn run(zones: &MultiZoneConfig, selector: &ZoneSelector) -> SeedSyncExitCode {
    let selected = match zones.select(selector) {
        Ok(selected) => selected,
        Err(e) => {
            error!("{}", e);
            return SeedSyncExitCode::ConfigError;
        }
    };

    let mut outcome = SeedSyncExitCode::Success;
    for (name, config) in selected {
        let code = run_zone(name, config).await;
        if code != SeedSyncExitCode::Success {
            warn!("Zone '{}' finished with {:?}", name, code);
        }
        outcome = outcome.worst(code);
    }
    outcome
}

/// Run one synchronization
async fn run_zone(name: &str, config: &SeedSyncConfig) -> SeedSyncExitCode {
    info!(
        "Starting seedsync run for '{}': zone {}, versions {:?}{}",
        name,
        config.zone.zone_id,
        config.zone.versions,
        if config.run.dry_run { " [DRY-RUN]" } else { "" }
    );

    let _lock = match &config.run.lock_path {
        Some(path) => match RunLock::acquire(path).await {
            Ok(lock) => Some(lock),
            Err(Error::RunLocked(reason)) => {
                warn!("Skipping run: {}", reason);
                return SeedSyncExitCode::Locked;
            }
            Err(e) => {
                error!("Failed to acquire lock file {}: {}", path, e);
                return SeedSyncExitCode::ConfigError;
            }
        },
        None => None,
    };

    let registry = build_registry();

    let sync = match create_sync(&registry, config) {
        Ok(sync) => sync,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return SeedSyncExitCode::ConfigError;
        }
    };

    match sync.run().await {
        Ok(report) => {
            if report.dry_run {
                info!(
                    "Dry run complete: would publish {} seed(s) into version {}",
                    report.candidates.len(),
                    report.target_version
                );
            } else {
                info!(
                    "Done: published {} seed(s), version {} is now active (was {})",
                    report.candidates.len(),
                    report.target_version,
                    report.previous_version
                );
            }
            SeedSyncExitCode::Success
        }
        Err(failure) => {
            let code = SeedSyncExitCode::from(&failure);
            info!("Run failed, exiting with {:?}", code);
            code
        }
    }
}

fn create_sync(registry: &Registry, config: &SeedSyncConfig) -> Result<SeedSync> {
    let peer_source = registry.create_peer_source(&config.peer_source)?;
    let zone_editor = registry.create_zone_editor(&config.zone_editor)?;
    info!(
        "Using peer source '{}' and zone editor '{}'",
        peer_source.source_name(),
        zone_editor.provider_name()
    );
    Ok(SeedSync::new(peer_source, zone_editor, config)?)
}
