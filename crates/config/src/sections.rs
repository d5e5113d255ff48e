//! Individual configuration sections

use obae_types::{BeatmapId, IdPolicy, MirrorSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Working and output locations
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    /// Directory receiving downloaded archives (default: `<tmp>/obae`)
    pub working_dir: Option<PathBuf>,
    /// Directory receiving extracted artwork (default: current directory)
    pub output_dir: Option<PathBuf>,
}

impl GeneralConfig {
    #[must_use]
    pub fn working_dir(&self) -> PathBuf {
        self.working_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("obae"))
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

/// Anonymous mirror fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorsConfig {
    #[serde(default = "default_mirror_order")]
    pub order: Vec<MirrorSource>,
    #[serde(default = "default_per_mirror_timeout")]
    pub per_mirror_timeout_secs: u64,
    /// Per-mirror URL template overrides, keyed by mirror name
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

impl Default for MirrorsConfig {
    fn default() -> Self {
        Self {
            order: default_mirror_order(),
            per_mirror_timeout_secs: default_per_mirror_timeout(),
            templates: BTreeMap::new(),
        }
    }
}

impl MirrorsConfig {
    #[must_use]
    pub fn per_mirror_timeout(&self) -> Duration {
        Duration::from_secs(self.per_mirror_timeout_secs)
    }

    /// URL template for a mirror, honouring overrides
    #[must_use]
    pub fn template(&self, mirror: MirrorSource) -> &str {
        self.templates
            .get(mirror.as_str())
            .map_or_else(|| mirror.default_template(), String::as_str)
    }

    /// Download URL for `id` on `mirror`
    #[must_use]
    pub fn url_for(&self, mirror: MirrorSource, id: &BeatmapId) -> String {
        self.template(mirror)
            .replace(obae_types::mirror::ID_PLACEHOLDER, id.as_str())
    }
}

/// Session-gated official source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficialConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_cookie_domain")]
    pub cookie_domain: String,
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,
    #[serde(default = "default_trigger_selector")]
    pub trigger_selector: String,
    /// Substring identifying the signed archive URL among page requests
    #[serde(default = "default_redirect_host")]
    pub redirect_host: String,
    /// Fallback file name when the response has no usable name
    #[serde(default = "default_official_filename")]
    pub default_filename: String,
    /// Bound on the whole official attempt
    #[serde(default = "default_official_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout_ms: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Try mirrors after a failed credentialed attempt
    #[serde(default)]
    pub fallback_to_mirrors: bool,
}

impl Default for OfficialConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cookie_name: default_cookie_name(),
            cookie_domain: default_cookie_domain(),
            cookie_path: default_cookie_path(),
            trigger_selector: default_trigger_selector(),
            redirect_host: default_redirect_host(),
            default_filename: default_official_filename(),
            timeout_secs: default_official_timeout(),
            discovery_timeout_ms: default_discovery_timeout(),
            poll_interval_ms: default_poll_interval(),
            fallback_to_mirrors: false,
        }
    }
}

impl OfficialConfig {
    /// Beatmap set page for `id`
    #[must_use]
    pub fn page_url(&self, id: &BeatmapId) -> String {
        format!("{}{}", self.base_url, id)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Headless Chromium process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Explicit binary; searched on `PATH` when unset
    pub executable: Option<PathBuf>,
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_launch_timeout")]
    pub launch_timeout_secs: u64,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            headless: default_headless(),
            launch_timeout_secs: default_launch_timeout(),
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    #[must_use]
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout_secs: u64,
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            pool_idle_timeout_secs: default_pool_idle_timeout(),
            pool_max_idle_per_host: default_pool_max_idle(),
            user_agent: default_user_agent(),
        }
    }
}

/// Raw input validation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct IdentifierConfig {
    #[serde(default)]
    pub policy: IdPolicy,
}

// Default value functions for serde

fn default_mirror_order() -> Vec<MirrorSource> {
    MirrorSource::ALL.to_vec()
}

fn default_per_mirror_timeout() -> u64 {
    30
}

fn default_base_url() -> String {
    "https://osu.ppy.sh/beatmapsets/".to_string()
}

fn default_cookie_name() -> String {
    "osu_session".to_string()
}

fn default_cookie_domain() -> String {
    ".ppy.sh".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

fn default_trigger_selector() -> String {
    "a.btn-osu-big.btn-osu-big--beatmapset-header".to_string()
}

fn default_redirect_host() -> String {
    "osumirror.idle.host".to_string()
}

fn default_official_filename() -> String {
    "beatmap.zip".to_string()
}

fn default_official_timeout() -> u64 {
    120
}

fn default_discovery_timeout() -> u64 {
    10_000
}

fn default_poll_interval() -> u64 {
    100
}

fn default_headless() -> bool {
    true
}

fn default_launch_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_pool_idle_timeout() -> u64 {
    90
}

fn default_pool_max_idle() -> usize {
    4
}

fn default_user_agent() -> String {
    format!("obae/{}", env!("CARGO_PKG_VERSION"))
}
