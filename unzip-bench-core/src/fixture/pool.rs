use std::path::{Path, PathBuf};

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom as _;
use rand::{Rng, RngCore as _, SeedableRng as _};

use super::{Fixture, FixtureGenerator, FixtureSpec};
use crate::{Error, Result};

/// Fixtures that live in a scratch directory for the duration of a run.
///
/// The directory is removed by [`FixturePool::cleanup`], or on drop if cleanup never ran.
/// A directory that existed before the pool was opened is kept; only the fixtures written
/// into it are deleted.
#[derive(Debug)]
pub struct FixturePool {
    dir: PathBuf,
    created_dir: bool,
    fixtures: Vec<Fixture>,
    rng: SmallRng,
    cleaned: bool,
}

impl FixturePool {
    /// Opens (creating if needed) the scratch directory.
    pub async fn open(dir: impl Into<PathBuf>, seed: Option<u64>) -> Result<Self> {
        let dir = dir.into();
        let io_err = |source| Error::FixtureGeneration {
            path: dir.clone(),
            source,
        };
        let created_dir = !tokio::fs::try_exists(&dir).await.map_err(io_err)?;
        tokio::fs::create_dir_all(&dir).await.map_err(io_err)?;

        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        Ok(Self {
            dir,
            created_dir,
            fixtures: Vec::new(),
            rng,
            cleaned: false,
        })
    }

    /// Opens the directory and generates every spec in order.
    ///
    /// On failure the partially filled pool is dropped, which removes what was written.
    pub async fn generate(
        dir: impl Into<PathBuf>,
        specs: &[FixtureSpec],
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut pool = Self::open(dir, seed).await?;
        for spec in specs {
            pool.add(spec.clone()).await?;
        }
        Ok(pool)
    }

    /// Generates one more fixture. Archive writing runs on the blocking pool.
    pub async fn add(&mut self, spec: FixtureSpec) -> Result<&Fixture> {
        let dir = self.dir.clone();
        let seed = self.rng.next_u64();
        let fixture =
            tokio::task::spawn_blocking(move || FixtureGenerator::with_seed(dir, seed).create(&spec))
                .await??;

        self.fixtures.retain(|f| f.path != fixture.path);
        self.fixtures.push(fixture);
        self.fixtures.last().ok_or(Error::EmptyPool)
    }

    /// Deletes one fixture file and forgets it.
    pub async fn remove(&mut self, name: &str) -> Result<()> {
        let Some(idx) = self.fixtures.iter().position(|f| f.name == name) else {
            return Ok(());
        };
        let fixture = self.fixtures.remove(idx);
        remove_file(&fixture.path).await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// Uniform pick over the pool.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Fixture> {
        self.fixtures.choose(rng)
    }

    /// Removes the scratch directory (or just the fixtures, for a pre-existing directory).
    pub async fn cleanup(mut self) -> Result<()> {
        self.cleaned = true;
        if self.created_dir {
            return match tokio::fs::remove_dir_all(&self.dir).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(Error::Cleanup {
                    path: self.dir.clone(),
                    source,
                }),
            };
        }

        for fixture in std::mem::take(&mut self.fixtures) {
            remove_file(&fixture.path).await?;
        }
        Ok(())
    }
}

impl Drop for FixturePool {
    fn drop(&mut self) {
        if self.cleaned {
            return;
        }
        let result = if self.created_dir {
            std::fs::remove_dir_all(&self.dir)
        } else {
            self.fixtures
                .iter()
                .try_for_each(|f| std::fs::remove_file(&f.path))
        };
        if let Err(err) = result
            && err.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(dir = %self.dir.display(), error = %err, "scratch cleanup failed");
        }
    }
}

async fn remove_file(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(Error::Cleanup {
            path: path.to_path_buf(),
            source,
        }),
    }
}
