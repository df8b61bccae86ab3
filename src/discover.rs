//! Subcorpus discovery
//!
//! A corpus root holds one directory per subcorpus, named by an integer
//! (usually a year). Anything else in the root is ignored.

use crate::error::{Result, TallyError};
use crate::matcher::MatcherError;
use atoi::FromRadix10SignedChecked;
use glob::GlobError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Integer label of a subcorpus
pub type SubcorpusId = i64;

/// Default glob for corpus files inside a subcorpus directory
pub const DEFAULT_FILE_GLOB: &str = "*.conll*";

/// A numbered subdirectory of the corpus root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcorpus {
    pub id: SubcorpusId,
    pub path: PathBuf,
}

impl Subcorpus {
    /// Files in this subcorpus matching `file_glob`, sorted by path
    ///
    /// Entries that could not be read are kept in place as errors, so the
    /// caller decides whether they are fatal.
    pub fn list_files(&self, file_glob: &str) -> Result<Vec<Result<PathBuf, GlobError>>> {
        let dir = self.path.to_str().ok_or_else(|| {
            TallyError::config(format!("path {} is not valid UTF-8", self.path.display()))
        })?;
        let pattern = format!("{}/{}", glob::Pattern::escape(dir), file_glob);
        let mut entries: Vec<_> = glob::glob(&pattern)
            .map_err(|e| TallyError::config(format!("bad file glob {:?}: {}", file_glob, e)))?
            .filter(|entry| match entry {
                Ok(path) => path.is_file(),
                Err(_) => true,
            })
            .collect();
        entries.sort_by(|a, b| entry_path(a).cmp(entry_path(b)));
        Ok(entries)
    }
}

fn entry_path(entry: &Result<PathBuf, GlobError>) -> &Path {
    match entry {
        Ok(path) => path,
        Err(e) => e.path(),
    }
}

/// Path and cause of an entry the directory listing could not read
pub fn unreadable_entry(err: GlobError) -> (PathBuf, MatcherError) {
    let path = err.path().to_path_buf();
    (path, MatcherError::Io(err.into_error()))
}

/// Parse a directory name that is entirely an integer
pub fn parse_subcorpus_id(name: &str) -> Option<SubcorpusId> {
    let bytes = name.as_bytes();
    match SubcorpusId::from_radix_10_signed_checked(bytes) {
        (Some(id), used) if used == bytes.len() && bytes.iter().any(u8::is_ascii_digit) => {
            if bytes[0] == b'+' { None } else { Some(id) }
        }
        _ => None,
    }
}

/// Numeric subdirectories of `root`, in ascending numeric order
pub fn discover_subcorpora(root: &Path) -> Result<Vec<Subcorpus>> {
    let mut subcorpora = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        // follows symlinks, so a linked year directory still counts
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        match name.to_str().and_then(parse_subcorpus_id) {
            Some(id) => subcorpora.push(Subcorpus {
                id,
                path: entry.path(),
            }),
            None => debug!(name = ?name, "skipping non-numeric directory"),
        }
    }

    if subcorpora.is_empty() {
        return Err(TallyError::config(format!(
            "no numeric subcorpus directories in {}",
            root.display()
        )));
    }

    subcorpora.sort_by_key(|s| s.id);
    if let Some(pair) = subcorpora.windows(2).find(|w| w[0].id == w[1].id) {
        return Err(TallyError::config(format!(
            "directories {} and {} both name subcorpus {}",
            pair[0].path.display(),
            pair[1].path.display(),
            pair[0].id
        )));
    }

    Ok(subcorpora)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_subcorpus_id() {
        assert_eq!(parse_subcorpus_id("1999"), Some(1999));
        assert_eq!(parse_subcorpus_id("-5"), Some(-5));
        assert_eq!(parse_subcorpus_id("007"), Some(7));
        assert_eq!(parse_subcorpus_id("abc"), None);
        assert_eq!(parse_subcorpus_id("1999a"), None);
        assert_eq!(parse_subcorpus_id("+12"), None);
        assert_eq!(parse_subcorpus_id("-"), None);
        assert_eq!(parse_subcorpus_id(""), None);
        assert_eq!(parse_subcorpus_id("99999999999999999999"), None);
    }

    #[test]
    fn test_discovery_orders_numerically() {
        let dir = tempdir().unwrap();
        for name in ["1999", "abc", "2001", "10"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("2000"), "a file, not a subcorpus").unwrap();

        let ids: Vec<_> = discover_subcorpora(dir.path())
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![10, 1999, 2001]);
    }

    #[test]
    fn test_discovery_requires_numeric_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("abc")).unwrap();
        assert!(matches!(
            discover_subcorpora(dir.path()),
            Err(TallyError::Configuration(_))
        ));
    }

    #[test]
    fn test_discovery_rejects_duplicate_ids() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("1999")).unwrap();
        fs::create_dir(dir.path().join("01999")).unwrap();
        assert!(matches!(
            discover_subcorpora(dir.path()),
            Err(TallyError::Configuration(_))
        ));
    }

    #[test]
    fn test_files_are_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("1999");
        fs::create_dir(&sub).unwrap();
        for name in ["b.conllu", "a.conllu.gz", "notes.txt"] {
            fs::write(sub.join(name), "").unwrap();
        }

        let subcorpus = Subcorpus { id: 1999, path: sub };
        let names: Vec<_> = subcorpus
            .list_files(DEFAULT_FILE_GLOB)
            .unwrap()
            .into_iter()
            .map(|p| p.unwrap().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.conllu.gz", "b.conllu"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_subcorpus_is_discovered() {
        let dir = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        fs::create_dir(dir.path().join("1999")).unwrap();
        std::os::unix::fs::symlink(elsewhere.path(), dir.path().join("2000")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("2001")).unwrap();

        let ids: Vec<_> = discover_subcorpora(dir.path())
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![1999, 2000]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let sub = dir.path().join("2000");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("a.conllu"), "").unwrap();
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o000)).unwrap();
        let readable_anyway = fs::read_dir(&sub).is_ok();

        let subcorpus = Subcorpus { id: 2000, path: sub.clone() };
        let listed = subcorpus.list_files(DEFAULT_FILE_GLOB).unwrap();
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();

        // privileged users read through the mode bits
        if readable_anyway {
            return;
        }
        assert_eq!(listed.len(), 1);
        let (path, source) = unreadable_entry(listed.into_iter().next().unwrap().unwrap_err());
        assert!(path.ends_with("2000"));
        assert!(matches!(source, MatcherError::Io(_)));
    }
}
