use std::fs::File;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Archive formats MMock ships in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    /// Picks the format from the URL suffix.
    pub fn from_url(url: &str) -> Result<ArchiveFormat> {
        if url.ends_with("tar.gz") {
            Ok(ArchiveFormat::TarGz)
        } else if url.ends_with("zip") {
            Ok(ArchiveFormat::Zip)
        } else {
            Err(Error::UnsupportedFormat(url.to_string()))
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => ".tar.gz",
            ArchiveFormat::Zip => ".zip",
        }
    }

    /// Unpacks `archive` into `dest`, creating `dest` if needed.
    pub fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        std::fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;
        match self {
            ArchiveFormat::TarGz => extract_tar_gz(archive, dest),
            ArchiveFormat::Zip => extract_zip(archive, dest),
        }
    }
}

pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| Error::io(archive, e))?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.unpack(dest).map_err(|e| Error::Extract {
        archive: archive.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| Error::io(archive, e))?;
    let extract_error = |message: String| Error::Extract {
        archive: archive.to_path_buf(),
        message,
    };
    let mut zip = ZipArchive::new(file).map_err(|e| extract_error(e.to_string()))?;
    zip.extract(dest).map_err(|e| extract_error(e.to_string()))
}
