//! Archive member iteration: zip, tar and cpio containers, each exposing
//! their members as a uniform stream of `ArchiveEntry` values.

use std::io::{Read, Seek};

use crate::detect::Format;
use crate::{Error, Result};

/// A single member of an archive, with just enough metadata for the
/// traversal layer to build a synthetic `outer{inner}` display path.
pub struct ArchiveEntry {
    /// The member's path within the archive.
    pub path: String,
    /// The uncompressed size, if the container records it up front.
    pub size: Option<u64>,
    /// The member's contents.
    pub data: Vec<u8>,
}

/// Reads every regular-file member out of a container archive.
///
/// Zip requires random access (`Read + Seek`) to read its central
/// directory; tar and cpio are read as a single forward pass. Members are
/// read fully into memory one at a time rather than returned as streaming
/// readers, since both the zip and cpio crates used here tie a member's
/// lifetime to a mutable borrow of the underlying archive value, which
/// does not compose with the rest of this crate's `Box<dyn Read>`
/// pipeline; callers that need to bound memory use per-archive size caps
/// instead (see `--zmax`-adjacent limits in the worker pool).
pub struct ContainerReader;

impl ContainerReader {
    /// Reads every member of a zip archive.
    pub fn read_zip<R: Read + Seek>(reader: R) -> Result<Vec<ArchiveEntry>> {
        let mut zip = zip::ZipArchive::new(reader).map_err(|e| Error::Corrupt {
            format: Format::Zip,
            detail: e.to_string(),
        })?;
        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            // An encrypted or corrupt member (zip's own error, not this
            // crate's) must not drop every other, perfectly readable member
            // in the same archive, so it's skipped rather than propagated.
            let mut file = match zip.by_index(i) {
                Ok(file) => file,
                Err(e) => {
                    warn!("skipping unreadable zip entry {}: {}", i, e);
                    continue;
                }
            };
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let size = file.size();
            let mut data = Vec::with_capacity(size as usize);
            if let Err(e) = file.read_to_end(&mut data) {
                warn!("skipping unreadable zip entry {:?}: {}", name, e);
                continue;
            }
            entries.push(ArchiveEntry {
                path: name,
                size: Some(size),
                data,
            });
        }
        Ok(entries)
    }

    /// Reads every regular-file member of a tar archive.
    pub fn read_tar<R: Read>(reader: R) -> Result<Vec<ArchiveEntry>> {
        let mut archive = tar::Archive::new(reader);
        let mut entries = Vec::new();
        for entry in archive.entries()? {
            let mut entry = entry?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let path = entry.path()?.to_string_lossy().into_owned();
            let size = entry.header().size().ok();
            let mut data = Vec::with_capacity(size.unwrap_or(0) as usize);
            entry.read_to_end(&mut data)?;
            entries.push(ArchiveEntry { path, size, data });
        }
        Ok(entries)
    }

    /// Reads every regular-file member of a newc-format cpio archive
    /// (the format produced by `find | cpio -o -H newc`).
    pub fn read_cpio<R: Read>(reader: R) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::new();
        let mut reader = cpio::newc::Reader::new(reader).map_err(|e| Error::Corrupt {
            format: Format::Cpio,
            detail: e.to_string(),
        })?;
        loop {
            let entry = reader.entry();
            if entry.name() == "TRAILER!!!" {
                break;
            }
            let path = entry.name().to_string();
            let is_file = entry.mode().is_file();
            let size = entry.file_size() as u64;
            let mut data = Vec::with_capacity(size as usize);
            if is_file {
                reader.read_to_end(&mut data)?;
            }
            reader = reader.finish().map_err(|e| Error::Corrupt {
                format: Format::Cpio,
                detail: e.to_string(),
            })?;
            if is_file {
                entries.push(ArchiveEntry {
                    path,
                    size: Some(size),
                    data,
                });
            }
        }
        Ok(entries)
    }
}
