use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use unzip_bench_core::{FixtureLayout, FixtureSpec, ScenarioConfig, WaveConfig};

/// Load scenario file. Every key is optional; CLI flags win over file values, file values
/// win over the built-in scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ScenarioYaml {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Per-request timeout.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout: Option<YamlDuration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<Vec<FixtureYaml>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub waves: Option<Vec<WaveYaml>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct FixtureYaml {
    pub name: String,
    pub size_mb: u64,
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub layout: FixtureLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct WaveYaml {
    pub name: String,
    pub requests: u64,
    pub concurrency: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct YamlDuration(Duration);

impl YamlDuration {
    fn into_inner(self) -> Duration {
        self.0
    }
}

impl Serialize for YamlDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(self.0).to_string())
    }
}

impl<'de> Deserialize<'de> for YamlDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;

        impl serde::de::Visitor<'_> for V {
            type Value = YamlDuration;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("duration as string (e.g. 30s), integer seconds, or float seconds")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(YamlDuration(Duration::from_secs(v)))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map(|secs| YamlDuration(Duration::from_secs(secs)))
                    .map_err(|_| E::custom("duration must not be negative"))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Duration::try_from_secs_f64(v)
                    .map(YamlDuration)
                    .map_err(|_| E::custom("duration must be a non-negative, finite number"))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                humantime::parse_duration(v)
                    .map(YamlDuration)
                    .map_err(E::custom)
            }
        }

        deserializer.deserialize_any(V)
    }
}

pub(crate) async fn load_scenario_yaml(path: &Path) -> anyhow::Result<ScenarioYaml> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read scenario YAML: {}", path.display()))?;

    parse_scenario_yaml(&bytes)
        .with_context(|| format!("failed to parse YAML: {}", path.display()))
}

fn parse_scenario_yaml(bytes: &[u8]) -> anyhow::Result<ScenarioYaml> {
    // An empty file means "built-in scenario".
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(ScenarioYaml::default());
    }
    Ok(serde_yaml::from_slice(bytes)?)
}

impl ScenarioYaml {
    /// Overlays the file onto `base`.
    pub(crate) fn apply(self, mut base: ScenarioConfig) -> ScenarioConfig {
        let Self {
            base_url,
            scratch_dir,
            seed,
            timeout,
            pool,
            waves,
        } = self;

        if let Some(base_url) = base_url {
            base.base_url = base_url;
        }
        if let Some(scratch_dir) = scratch_dir {
            base.scratch_dir = scratch_dir;
        }
        if seed.is_some() {
            base.seed = seed;
        }
        if let Some(timeout) = timeout {
            base.timeout = Some(timeout.into_inner());
        }
        if let Some(pool) = pool {
            base.pool = pool
                .into_iter()
                .map(|f| FixtureSpec::new(f.name, f.size_mb, f.depth).layout(f.layout))
                .collect();
        }
        if let Some(waves) = waves {
            base.waves = waves
                .into_iter()
                .map(|w| WaveConfig::new(w.name, w.requests, w.concurrency))
                .collect();
        }
        base
    }
}
