use super::{DIR_MODE, FILE_MODE, Timestamp, entry_name};
use crate::error::Error;
use crate::result::Result;
use std::fs::File;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub(super) fn write(source_dir: &Path, output_path: &Path, mtime: Timestamp) -> Result<Vec<String>> {
    let file = File::create(output_path).map_err(|e| Error::io_at("creating", output_path, e))?;
    let mut zip = ZipWriter::new(file);

    let base = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(mtime.to_zip()?);
    let dir_options = base.clone().unix_permissions(DIR_MODE);
    let file_options = base.unix_permissions(FILE_MODE);

    let mut entries = Vec::new();
    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let name = entry_name(source_dir, entry.path())?;

        if entry.file_type().is_dir() {
            zip.add_directory(name.as_str(), dir_options.clone())?;
            entries.push(format!("{}/", name));
        } else if entry.file_type().is_file() {
            zip.start_file(name.as_str(), file_options.clone())?;
            let mut f = File::open(entry.path()).map_err(|e| Error::io_at("reading", entry.path(), e))?;
            io::copy(&mut f, &mut zip)?;
            entries.push(name);
        }
    }

    zip.finish()?;
    Ok(entries)
}
