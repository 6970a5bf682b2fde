use std::path::{Path, PathBuf};

use anyhow::Context as _;
use unzip_bench_core::{FixtureGenerator, FixtureSpec, write_sample_payload};

use crate::cli::FixtureArgs;
use crate::exit_codes::ExitCode;
use crate::run_error::RunError;

const DEFAULT_SAMPLE_PATH: &str = "test_archive.zip";

pub async fn fixture(args: FixtureArgs) -> Result<ExitCode, RunError> {
    tokio::task::spawn_blocking(move || write_fixture(args))
        .await
        .context("fixture writer panicked")
        .map_err(RunError::RuntimeError)?
}

fn write_fixture(args: FixtureArgs) -> Result<ExitCode, RunError> {
    if args.sample {
        let path = args
            .out
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SAMPLE_PATH));
        let size = write_sample_payload(&path)?;
        println!("wrote {} ({size} bytes)", path.display());
        return Ok(ExitCode::Success);
    }

    let size_mb = args.size_mb.ok_or_else(|| {
        RunError::InvalidInput(anyhow::anyhow!("--size-mb is required without --sample"))
    })?;
    let (dir, name) = match &args.out {
        Some(out) => split_out_path(out)?,
        None => (
            PathBuf::from("."),
            format!("fixture_{size_mb}mb_depth{}", args.depth),
        ),
    };

    let spec = FixtureSpec::new(name, size_mb, args.depth).layout(args.layout);
    let mut generator = match args.seed {
        Some(seed) => FixtureGenerator::with_seed(dir, seed),
        None => FixtureGenerator::new(dir),
    };
    let fixture = generator.create(&spec)?;

    println!(
        "wrote {} ({} bytes, {} entries, depth {}, {} layout)",
        fixture.path.display(),
        fixture.size_bytes,
        fixture.entries,
        fixture.depth,
        spec.layout
    );
    Ok(ExitCode::Success)
}

/// `dir/name.zip` into `(dir, name)`.
fn split_out_path(out: &Path) -> Result<(PathBuf, String), RunError> {
    let invalid = || {
        RunError::InvalidInput(anyhow::anyhow!(
            "--out must name a .zip file: {}",
            out.display()
        ))
    };

    let is_zip = out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
    if !is_zip {
        return Err(invalid());
    }
    let name = out
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(invalid)?;

    let dir = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use unzip_bench_core::FixtureLayout;

    #[test]
    fn out_path_splits_into_dir_and_name() {
        let (dir, name) = match split_out_path(Path::new("data/big.zip")) {
            Ok(v) => v,
            Err(err) => panic!("split failed: {err}"),
        };
        assert_eq!(dir, PathBuf::from("data"));
        assert_eq!(name, "big");

        let (dir, _) = match split_out_path(Path::new("flat.ZIP")) {
            Ok(v) => v,
            Err(err) => panic!("split failed: {err}"),
        };
        assert_eq!(dir, PathBuf::from("."));
    }

    #[test]
    fn out_path_must_be_a_zip() {
        for bad in ["data/big.tar", "noext", ".zip"] {
            let err = match split_out_path(Path::new(bad)) {
                Ok(v) => panic!("{bad} accepted as {v:?}"),
                Err(err) => err,
            };
            assert_eq!(err.exit_code(), ExitCode::InvalidInput);
        }
    }

    #[test]
    fn writes_generated_fixture_to_out() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(err) => panic!("tempdir: {err}"),
        };
        let out = dir.path().join("one.zip");

        let code = write_fixture(FixtureArgs {
            out: Some(out.clone()),
            sample: false,
            size_mb: Some(1),
            depth: 1,
            layout: FixtureLayout::Even,
            seed: Some(5),
        });

        assert!(matches!(code, Ok(ExitCode::Success)));
        let len = std::fs::metadata(&out).map(|m| m.len()).unwrap_or(0);
        assert!(len > 0 && len <= 1024 * 1024, "unexpected size {len}");
    }

    #[test]
    fn writes_sample_payload() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(err) => panic!("tempdir: {err}"),
        };
        let out = dir.path().join("sample.zip");

        let code = write_fixture(FixtureArgs {
            out: Some(out.clone()),
            sample: true,
            size_mb: None,
            depth: 0,
            layout: FixtureLayout::default(),
            seed: None,
        });

        assert!(matches!(code, Ok(ExitCode::Success)));
        assert!(out.exists());
    }
}
