mod generate;
mod pool;
mod sample;

use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use rand::SeedableRng as _;
use rand::rngs::SmallRng;

use crate::{Error, Result};

pub use pool::FixturePool;
pub use sample::write_sample_payload;

/// Deepest archive nesting the generator will build.
pub const MAX_NESTING_DEPTH: u32 = 8;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// How a fixture's byte budget is spread over its entries.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FixtureLayout {
    /// Five entries per level; each level keeps `budget / (remaining_depth + 1)` for its own
    /// entries and hands the rest to `nested_level_<depth>.zip`.
    Even,
    /// Five small entries (10%), one bulk entry (40%) and a `nested.zip` of ten entries (50%).
    #[default]
    Weighted,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FixtureSpec {
    pub name: String,
    pub size_mb: u64,
    pub depth: u32,
    #[serde(default)]
    pub layout: FixtureLayout,
}

impl FixtureSpec {
    pub fn new(name: impl Into<String>, size_mb: u64, depth: u32) -> Self {
        Self {
            name: name.into(),
            size_mb,
            depth,
            layout: FixtureLayout::default(),
        }
    }

    #[must_use]
    pub fn layout(mut self, layout: FixtureLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn target_bytes(&self) -> u64 {
        self.size_mb.saturating_mul(BYTES_PER_MB)
    }

    pub fn file_name(&self) -> String {
        format!("{}.zip", self.name)
    }
}

/// A generated archive on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub name: String,
    pub path: PathBuf,
    pub target_bytes: u64,
    pub depth: u32,
    /// Entries in the outermost archive, nested archives included.
    pub entries: usize,
    /// Compressed size on disk.
    pub size_bytes: u64,
}

/// Writes fixture archives into one directory.
///
/// Entry contents come from the generator's RNG, so two generators built with the same seed
/// produce identical archives.
#[derive(Debug)]
pub struct FixtureGenerator {
    dir: PathBuf,
    rng: SmallRng,
}

impl FixtureGenerator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_seed(dir, rand::random())
    }

    pub fn with_seed(dir: impl Into<PathBuf>, seed: u64) -> Self {
        Self {
            dir: dir.into(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Builds `<dir>/<name>.zip`, overwriting any existing file.
    pub fn create(&mut self, spec: &FixtureSpec) -> Result<Fixture> {
        if spec.depth > MAX_NESTING_DEPTH {
            return Err(Error::DepthTooLarge(spec.depth));
        }

        let path = self.dir.join(spec.file_name());
        let fail = |source: std::io::Error| Error::FixtureGeneration {
            path: path.clone(),
            source,
        };

        let file = std::fs::File::create(&path).map_err(fail)?;
        let entries = generate::write_archive(
            BufWriter::new(file),
            &mut self.rng,
            spec.layout,
            spec.target_bytes(),
            spec.depth,
        )
        .and_then(|(mut writer, entries)| {
            writer.flush()?;
            Ok(entries)
        })
        .map_err(|err| fail(err.into()))?;

        let size_bytes = std::fs::metadata(&path).map_err(fail)?.len();
        tracing::debug!(
            fixture = %spec.name,
            target_bytes = spec.target_bytes(),
            size_bytes,
            depth = spec.depth,
            layout = %spec.layout,
            "fixture generated"
        );

        Ok(Fixture {
            name: spec.name.clone(),
            path,
            target_bytes: spec.target_bytes(),
            depth: spec.depth,
            entries,
            size_bytes,
        })
    }
}

/// One-shot helper: generates `<name>.zip` in `dir` with the default layout.
pub fn create_fixture(dir: &Path, name: &str, size_mb: u64, depth: u32) -> Result<Fixture> {
    FixtureGenerator::new(dir).create(&FixtureSpec::new(name, size_mb, depth))
}
