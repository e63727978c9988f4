//! Versioned XML schema archives and the view-rendering facade.
//!
//! [`build`] runs the whole schema bundling step: reset the working tree,
//! stage matching `.xsd` files, archive the tree reproducibly and register
//! the archive. The [`view`] module holds the contract between request
//! handlers and a view engine.

pub mod archive;
pub mod artifact;
pub mod bundle;
pub mod cmd;
pub mod context;
pub mod error;
pub mod manifest;
pub mod result;
pub mod tpl;
pub mod utils;
pub mod version;
pub mod view;

use archive::ArchiveFormat;
use artifact::ArtifactRecord;
use bundle::{BundleSpec, StagedFile};
use result::Result;

/// Progress reported by [`build_with`] as each step begins or finishes
#[derive(Debug)]
pub enum BuildEvent<'a> {
    Staging,
    Staged(&'a [StagedFile]),
    Archiving(ArchiveFormat),
    Registered(&'a ArtifactRecord),
}

/// Stage, archive and register the schemas described by `spec`
pub fn build(spec: &BundleSpec) -> Result<ArtifactRecord> {
    build_with(spec, |_| {})
}

/// Same as [`build`], reporting each step to `on_event`
pub fn build_with<F>(spec: &BundleSpec, mut on_event: F) -> Result<ArtifactRecord>
where
    F: FnMut(BuildEvent<'_>),
{
    spec.validate()?;

    on_event(BuildEvent::Staging);
    let staged = bundle::stage(spec)?;
    on_event(BuildEvent::Staged(&staged));

    on_event(BuildEvent::Archiving(spec.format));
    let entries = archive::create(spec.format, &spec.work_dir, &spec.target, spec.mtime)?;
    let record = artifact::register(spec, entries)?;
    on_event(BuildEvent::Registered(&record));

    Ok(record)
}
