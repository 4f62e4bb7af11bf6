//! Archive extraction for downloaded files.
//!
//! The format is chosen from the file name: `.zip`, `.tar`, `.tar.gz`/`.tgz`
//! and `.tar.bz2`/`.tbz`. Members are written under the target directory and
//! never outside it.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use crate::error::ExtractError;

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
    TarBz2,
}

impl ArchiveKind {
    /// Detects the format from the file name suffix (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz") {
            Some(Self::TarBz2)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Extracts every member of the archive at `path` into `target` (default: the
/// archive's directory). Returns `target/<member>` for each member, directories
/// included, in archive order.
pub fn extract_all(path: &Path, target: Option<&Path>) -> Result<Vec<PathBuf>, ExtractError> {
    let kind = ArchiveKind::from_path(path)
        .ok_or_else(|| ExtractError::UnsupportedFormat(path.to_path_buf()))?;
    let target = match target {
        Some(t) => t.to_path_buf(),
        None => path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    fs::create_dir_all(&target)?;
    tracing::info!(archive = %path.display(), target = %target.display(), ?kind, "extracting");

    let file = BufReader::new(File::open(path)?);
    let members = match kind {
        ArchiveKind::Zip => extract_zip(file, &target)?,
        ArchiveKind::Tar => extract_tar(file, &target)?,
        ArchiveKind::TarGz => extract_tar(flate2::read::GzDecoder::new(file), &target)?,
        ArchiveKind::TarBz2 => extract_tar(bzip2::read::BzDecoder::new(file), &target)?,
    };
    tracing::debug!(archive = %path.display(), members = members.len(), "extracted");
    Ok(members)
}

fn extract_zip<R: Read + Seek>(reader: R, target: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut members = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(name) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!(member = entry.name(), "skipping zip member with unsafe path");
            continue;
        };
        let out = target.join(&name);
        if entry.is_dir() {
            fs::create_dir_all(&out)?;
        } else {
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut dest = File::create(&out)?;
            io::copy(&mut entry, &mut dest)?;
            if let Some(mode) = entry.unix_mode() {
                set_mode(&out, mode)?;
            }
        }
        members.push(out);
    }
    Ok(members)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

fn extract_tar<R: Read>(reader: R, target: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut archive = tar::Archive::new(reader);
    let mut members = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.into_owned();
        if entry.unpack_in(target)? {
            members.push(target.join(name));
        } else {
            tracing::warn!(member = %name.display(), "skipping tar member with unsafe path");
        }
    }
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn kind_from_suffix() {
        assert_eq!(ArchiveKind::from_path(Path::new("a.zip")), Some(ArchiveKind::Zip));
        assert_eq!(ArchiveKind::from_path(Path::new("A.TAR.GZ")), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::from_path(Path::new("a.tgz")), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::from_path(Path::new("a.tar.bz2")), Some(ArchiveKind::TarBz2));
        assert_eq!(ArchiveKind::from_path(Path::new("a.tbz")), Some(ArchiveKind::TarBz2));
        assert_eq!(ArchiveKind::from_path(Path::new("dir/a.tar")), Some(ArchiveKind::Tar));
        assert_eq!(ArchiveKind::from_path(Path::new("a.rar")), None);
        assert_eq!(ArchiveKind::from_path(Path::new("zip")), None);
    }

    #[test]
    fn unknown_suffix_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("notes.txt");
        fs::write(&p, b"x").unwrap();
        assert!(matches!(
            extract_all(&p, None),
            Err(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn zip_members_listed_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        {
            let mut w = zip::ZipWriter::new(File::create(&archive).unwrap());
            let opts = zip::write::FileOptions::default();
            w.add_directory("docs/", opts).unwrap();
            w.start_file("docs/readme.txt", opts).unwrap();
            w.write_all(b"hello").unwrap();
            w.start_file("top.bin", opts).unwrap();
            w.write_all(&[1, 2, 3]).unwrap();
            w.finish().unwrap();
        }

        let out = dir.path().join("out");
        let members = extract_all(&archive, Some(&out)).unwrap();
        assert_eq!(
            members,
            vec![
                out.join("docs"),
                out.join("docs").join("readme.txt"),
                out.join("top.bin"),
            ]
        );
        assert_eq!(fs::read(out.join("docs/readme.txt")).unwrap(), b"hello");
        assert!(out.join("docs").is_dir());
    }

    fn build_tar<W: Write>(w: W) -> W {
        let mut b = tar::Builder::new(w);
        let data = b"tar contents";
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        b.append_data(&mut header, "pkg/file.txt", &data[..]).unwrap();
        b.into_inner().unwrap()
    }

    #[test]
    fn tar_gz_defaults_to_archive_directory() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.tar.gz");
        let gz = flate2::write::GzEncoder::new(
            File::create(&archive).unwrap(),
            flate2::Compression::default(),
        );
        build_tar(gz).finish().unwrap();

        let members = extract_all(&archive, None).unwrap();
        assert_eq!(members, vec![dir.path().join("pkg/file.txt")]);
        assert_eq!(
            fs::read(dir.path().join("pkg/file.txt")).unwrap(),
            b"tar contents"
        );
    }

    #[test]
    fn tar_bz2_is_supported() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pkg.tbz");
        let bz = bzip2::write::BzEncoder::new(
            File::create(&archive).unwrap(),
            bzip2::Compression::default(),
        );
        build_tar(bz).finish().unwrap();

        let out = dir.path().join("x");
        let members = extract_all(&archive, Some(&out)).unwrap();
        assert_eq!(members, vec![out.join("pkg/file.txt")]);
    }

    #[test]
    fn corrupt_zip_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.zip");
        fs::write(&archive, b"not a zip").unwrap();
        assert!(matches!(
            extract_all(&archive, None),
            Err(ExtractError::Zip(_))
        ));
    }
}
