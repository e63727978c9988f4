use super::{DIR_MODE, FILE_MODE, Timestamp, entry_name};
use crate::error::Error;
use crate::result::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io;
use std::path::Path;
use tar::{Builder, EntryType, Header};
use walkdir::WalkDir;

pub(super) fn write(source_dir: &Path, output_path: &Path, mtime: Timestamp) -> Result<Vec<String>> {
    let tar_gz = File::create(output_path).map_err(|e| Error::io_at("creating", output_path, e))?;
    let enc = GzEncoder::new(tar_gz, Compression::default());
    let mut tar = Builder::new(enc);

    let mut entries = Vec::new();
    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let name = entry_name(source_dir, entry.path())?;

        let mut header = Header::new_gnu();
        header.set_mtime(mtime.unix());
        header.set_uid(0);
        header.set_gid(0);

        if entry.file_type().is_dir() {
            let name = format!("{}/", name);
            header.set_entry_type(EntryType::Directory);
            header.set_mode(DIR_MODE);
            header.set_size(0);
            tar.append_data(&mut header, &name, io::empty())?;
            entries.push(name);
        } else if entry.file_type().is_file() {
            let f = File::open(entry.path()).map_err(|e| Error::io_at("reading", entry.path(), e))?;
            header.set_entry_type(EntryType::Regular);
            header.set_mode(FILE_MODE);
            header.set_size(f.metadata()?.len());
            tar.append_data(&mut header, &name, f)?;
            entries.push(name);
        }
    }

    tar.into_inner()?.finish()?;
    Ok(entries)
}
