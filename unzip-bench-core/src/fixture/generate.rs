use std::io::{Cursor, Seek, Write};

use rand::Rng;
use rand::distr::Alphanumeric;
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::FixtureLayout;

const ENTRIES_PER_LEVEL: u64 = 5;
const WEIGHTED_NESTED_ENTRIES: u64 = 10;
const FILLER_CHUNK: usize = 100;
const NAME_SUFFIX_LEN: usize = 5;

/// Writes a complete archive into `writer` and returns it along with the number of
/// top-level entries.
pub(super) fn write_archive<W: Write + Seek, R: Rng>(
    writer: W,
    rng: &mut R,
    layout: FixtureLayout,
    budget: u64,
    depth: u32,
) -> ZipResult<(W, usize)> {
    let mut zip = ZipWriter::new(writer);
    let entries = match layout {
        FixtureLayout::Even => even_level(&mut zip, rng, "", budget, depth)?,
        FixtureLayout::Weighted => weighted_top(&mut zip, rng, budget, depth)?,
    };
    Ok((zip.finish()?, entries))
}

// Fixed timestamps keep seeded archives byte-for-byte reproducible.
fn options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
}

fn even_level<W: Write + Seek, R: Rng>(
    zip: &mut ZipWriter<W>,
    rng: &mut R,
    prefix: &str,
    budget: u64,
    depth: u32,
) -> ZipResult<usize> {
    let own = budget / (u64::from(depth) + 1);
    let per_entry = own / ENTRIES_PER_LEVEL;
    for i in 0..ENTRIES_PER_LEVEL {
        write_text_entry(zip, rng, prefix, i, per_entry)?;
    }

    if depth == 0 {
        return Ok(ENTRIES_PER_LEVEL as usize);
    }

    let nested_prefix = format!("level_{depth}_");
    let mut inner = ZipWriter::new(Cursor::new(Vec::new()));
    even_level(&mut inner, rng, &nested_prefix, budget - own, depth - 1)?;
    let inner = inner.finish()?.into_inner();

    zip.start_file(format!("{prefix}nested_level_{depth}.zip"), options())?;
    zip.write_all(&inner)?;
    Ok(ENTRIES_PER_LEVEL as usize + 1)
}

fn weighted_top<W: Write + Seek, R: Rng>(
    zip: &mut ZipWriter<W>,
    rng: &mut R,
    budget: u64,
    depth: u32,
) -> ZipResult<usize> {
    // A flat archive is just the five entries; bulk and nesting need depth > 0.
    if depth == 0 {
        let per_entry = budget / ENTRIES_PER_LEVEL;
        for i in 0..ENTRIES_PER_LEVEL {
            write_text_entry(zip, rng, "", i, per_entry)?;
        }
        return Ok(ENTRIES_PER_LEVEL as usize);
    }

    let small = budget / 10 / ENTRIES_PER_LEVEL;
    for i in 0..ENTRIES_PER_LEVEL {
        write_text_entry(zip, rng, "", i, small)?;
    }
    let nested = budget / 2;
    write_text_entry(zip, rng, "", ENTRIES_PER_LEVEL, budget * 4 / 10)?;

    let mut inner = ZipWriter::new(Cursor::new(Vec::new()));
    weighted_nested(&mut inner, rng, nested, depth - 1)?;
    let inner = inner.finish()?.into_inner();

    zip.start_file("nested.zip", options())?;
    zip.write_all(&inner)?;
    Ok(ENTRIES_PER_LEVEL as usize + 2)
}

// Ten equal entries; while depth remains, half the budget moves one level further down.
fn weighted_nested<W: Write + Seek, R: Rng>(
    zip: &mut ZipWriter<W>,
    rng: &mut R,
    budget: u64,
    remaining: u32,
) -> ZipResult<()> {
    let own = if remaining == 0 { budget } else { budget / 2 };
    let per_entry = own / WEIGHTED_NESTED_ENTRIES;
    for i in 0..WEIGHTED_NESTED_ENTRIES {
        write_text_entry(zip, rng, "", i, per_entry)?;
    }

    if remaining > 0 {
        let mut inner = ZipWriter::new(Cursor::new(Vec::new()));
        weighted_nested(&mut inner, rng, budget - own, remaining - 1)?;
        let inner = inner.finish()?.into_inner();
        zip.start_file("nested.zip", options())?;
        zip.write_all(&inner)?;
    }
    Ok(())
}

fn write_text_entry<W: Write + Seek, R: Rng>(
    zip: &mut ZipWriter<W>,
    rng: &mut R,
    prefix: &str,
    index: u64,
    size: u64,
) -> ZipResult<()> {
    let name = format!("{prefix}file_{index}_{}.txt", random_suffix(rng));
    zip.start_file(name, options())?;
    zip.write_all(&filler(rng, size))?;
    Ok(())
}

fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..NAME_SUFFIX_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// `size` rounded down to a multiple of 100 bytes: one random alphanumeric chunk repeated.
/// Repetition keeps the compressed archive far below the uncompressed budget.
pub(super) fn filler<R: Rng>(rng: &mut R, size: u64) -> Vec<u8> {
    let chunk: Vec<u8> = (0..FILLER_CHUNK).map(|_| rng.sample(Alphanumeric)).collect();
    let repeats = usize::try_from(size).unwrap_or(usize::MAX) / FILLER_CHUNK;
    chunk.repeat(repeats)
}
