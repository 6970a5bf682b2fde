use std::io::{BufWriter, Cursor, Write as _};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::{Error, Result};

/// Writes the small hand-shaped archive used for manual checks against the service:
///
/// ```text
/// file1.txt
/// file2.txt
/// folder1/file3.txt
/// nested.zip
///   nested_file1.txt
///   nested_file2.txt
/// ```
///
/// Entries are stored uncompressed. Returns the archive size in bytes.
pub fn write_sample_payload(path: &Path) -> Result<u64> {
    let fail = |source: std::io::Error| Error::FixtureGeneration {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(fail)?;
    build(BufWriter::new(file))
        .and_then(|mut writer| {
            writer.flush()?;
            Ok(())
        })
        .map_err(|err| fail(err.into()))?;

    Ok(std::fs::metadata(path).map_err(fail)?.len())
}

fn build<W: std::io::Write + std::io::Seek>(writer: W) -> zip::result::ZipResult<W> {
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut nested = ZipWriter::new(Cursor::new(Vec::new()));
    nested.start_file("nested_file1.txt", stored)?;
    nested.write_all(b"Nested file 1 content")?;
    nested.start_file("nested_file2.txt", stored)?;
    nested.write_all(b"Nested file 2 content")?;
    let nested = nested.finish()?.into_inner();

    let mut zip = ZipWriter::new(writer);
    zip.start_file("file1.txt", stored)?;
    zip.write_all(b"This is file 1")?;
    zip.start_file("file2.txt", stored)?;
    zip.write_all(b"This is file 2")?;
    zip.start_file("folder1/file3.txt", stored)?;
    zip.write_all(b"This is file 3 in a folder")?;
    zip.start_file("nested.zip", stored)?;
    zip.write_all(&nested)?;
    zip.finish()
}
