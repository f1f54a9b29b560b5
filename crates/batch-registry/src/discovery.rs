//! Discovery of job declaration files
//!
//! Each extension module declares its jobs in one of two places, relative to
//! the module root:
//!
//! - a directory `config/batch_jobs/`, every regular file of which (at any
//!   depth) is a declaration
//! - otherwise a single file `config/batch_jobs.yml`
//!
//! A module with neither contributes nothing. Files are returned in
//! lexicographic path order whatever order the filesystem lists them in.

use crate::error::{RegistryError, Result};
use crate::resources::ResourceTracker;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Directory holding a module's declaration files
pub const JOBS_DIR: &str = "config/batch_jobs";

/// Single-file declaration used when the directory is absent
pub const JOBS_FILE: &str = "config/batch_jobs.yml";

/// A discovered declaration file and its raw contents
///
/// Contents are kept as bytes; decoding is part of parsing, so a file that is
/// not UTF-8 fails as that one source rather than failing discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDefinitionSource {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl JobDefinitionSource {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Read a declaration file from disk
    pub fn read(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read(&path).map_err(|e| RegistryError::discovery(&path, e))?;
        Ok(Self { path, contents })
    }

    /// Contents as text, or a parse error naming the file
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents)
            .map_err(|e| RegistryError::parse(&self.path, format!("file is not valid UTF-8: {}", e)))
    }
}

/// Sort sources into discovery order (lexicographic by path)
pub fn sort_sources(sources: &mut [JobDefinitionSource]) {
    sources.sort_by(|a, b| a.path.cmp(&b.path));
}

/// Locate and read the declaration files of one module.
///
/// Files come back in component-wise `PathBuf` order (the order of
/// [`sort_sources`]): a directory sorts before a sibling file sharing its
/// prefix, so `a/z.yml` comes before `a.yml`. Symbolic links to regular files
/// are declarations like any other file. Every located path is reported to
/// `tracker` before it is read.
pub fn locate<T>(module_root: &Path, tracker: &mut T) -> Result<Vec<JobDefinitionSource>>
where
    T: ResourceTracker + ?Sized,
{
    if !module_root.is_dir() {
        return Err(RegistryError::discovery(
            module_root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "module root is not a directory"),
        ));
    }

    let mut paths = declaration_paths(module_root)?;
    paths.sort();

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        tracker.track(&path);
        debug!(path = %path.display(), "Located job declaration");
        sources.push(JobDefinitionSource::read(path)?);
    }

    Ok(sources)
}

/// Locate the declaration files of every module, module by module.
///
/// Module order is the order of `module_roots`; within a module, files are in
/// path order.
pub fn locate_all<T>(module_roots: &[PathBuf], tracker: &mut T) -> Result<Vec<JobDefinitionSource>>
where
    T: ResourceTracker + ?Sized,
{
    let mut sources = Vec::new();
    for root in module_roots {
        let found = locate(root, tracker)?;
        info!(module = %root.display(), files = found.len(), "Discovered job declarations");
        sources.extend(found);
    }
    Ok(sources)
}

/// Declaration file paths of a module, unordered
fn declaration_paths(module_root: &Path) -> Result<Vec<PathBuf>> {
    let dir = module_root.join(JOBS_DIR);
    if dir.is_dir() {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry?;
            // Follows a symlink to its target; dangling links are not files
            if entry.path().is_file() {
                paths.push(entry.into_path());
            }
        }
        return Ok(paths);
    }

    let file = module_root.join(JOBS_FILE);
    if file.is_file() {
        return Ok(vec![file]);
    }

    Ok(Vec::new())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::resources::RecordingTracker;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_directory_is_walked_recursively_in_order() {
        let module = TempDir::new().unwrap();
        // Created out of order on purpose
        write(module.path(), "config/batch_jobs/zeta.yml", "z");
        write(module.path(), "config/batch_jobs/nested/beta.yml", "b");
        write(module.path(), "config/batch_jobs/alpha.yml", "a");

        let mut tracker = RecordingTracker::new();
        let sources = locate(module.path(), &mut tracker).unwrap();

        let names: Vec<String> = sources
            .iter()
            .map(|s| {
                s.path
                    .strip_prefix(module.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "config/batch_jobs/alpha.yml",
                "config/batch_jobs/nested/beta.yml",
                "config/batch_jobs/zeta.yml",
            ]
        );
        assert_eq!(sources[0].contents, b"a");

        let tracked: Vec<PathBuf> = sources.iter().map(|s| s.path.clone()).collect();
        assert_eq!(tracker.paths(), tracked.as_slice());
    }

    #[test]
    fn test_directory_takes_precedence_over_single_file() {
        let module = TempDir::new().unwrap();
        write(module.path(), "config/batch_jobs.yml", "single");
        write(module.path(), "config/batch_jobs/one.yml", "dir");

        let sources = locate(module.path(), &mut RecordingTracker::new()).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].contents, b"dir");
    }

    #[test]
    fn test_single_file_fallback() {
        let module = TempDir::new().unwrap();
        let file = write(module.path(), "config/batch_jobs.yml", "name: demo");

        let mut tracker = RecordingTracker::new();
        let sources = locate(module.path(), &mut tracker).unwrap();
        assert_eq!(sources, vec![JobDefinitionSource::new(&file, "name: demo")]);
        assert_eq!(tracker.into_paths(), vec![file]);
    }

    #[test]
    fn test_module_without_declarations() {
        let module = TempDir::new().unwrap();
        fs::create_dir_all(module.path().join("config")).unwrap();

        let mut tracker = RecordingTracker::new();
        let sources = locate(module.path(), &mut tracker).unwrap();
        assert!(sources.is_empty());
        assert!(tracker.paths().is_empty());
    }

    #[test]
    fn test_missing_module_root_is_a_discovery_error() {
        let module = TempDir::new().unwrap();
        let missing = module.path().join("not-installed");

        let err = locate(&missing, &mut RecordingTracker::new()).unwrap_err();
        assert!(matches!(err, RegistryError::Discovery { .. }));
        assert_eq!(err.path(), Some(missing.as_path()));
    }

    #[test]
    fn test_sort_sources_ignores_input_order() {
        let mut shuffled = vec![
            JobDefinitionSource::new("/m/config/batch_jobs/c.yml", ""),
            JobDefinitionSource::new("/m/config/batch_jobs/a/z.yml", ""),
            JobDefinitionSource::new("/m/config/batch_jobs/b.yml", ""),
            JobDefinitionSource::new("/m/config/batch_jobs/a.yml", ""),
        ];
        let mut reversed: Vec<JobDefinitionSource> = shuffled.iter().rev().cloned().collect();

        sort_sources(&mut shuffled);
        sort_sources(&mut reversed);

        assert_eq!(shuffled, reversed);
        // Component-wise: the directory `a` sorts before the file `a.yml`
        let paths: Vec<&str> = shuffled.iter().map(|s| s.path.to_str().unwrap()).collect();
        assert_eq!(
            paths,
            vec![
                "/m/config/batch_jobs/a/z.yml",
                "/m/config/batch_jobs/a.yml",
                "/m/config/batch_jobs/b.yml",
                "/m/config/batch_jobs/c.yml",
            ]
        );
    }

    #[test]
    fn test_binary_file_is_read_not_rejected() {
        let module = TempDir::new().unwrap();
        let path = module.path().join("config/batch_jobs/binary.yml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let sources = locate(module.path(), &mut RecordingTracker::new()).unwrap();
        assert_eq!(sources.len(), 1);

        let err = sources[0].text().unwrap_err();
        assert!(matches!(err, RegistryError::Parse { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_declaration_is_located() {
        let module = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let target = write(outside.path(), "shared.yml", "name: shared");
        let link = module.path().join("config/batch_jobs/linked.yml");
        fs::create_dir_all(link.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();
        let dangling = module.path().join("config/batch_jobs/dangling.yml");
        std::os::unix::fs::symlink(outside.path().join("absent.yml"), dangling).unwrap();

        let mut tracker = RecordingTracker::new();
        let sources = locate(module.path(), &mut tracker).unwrap();

        assert_eq!(sources, vec![JobDefinitionSource::new(&link, "name: shared")]);
        assert_eq!(tracker.into_paths(), vec![link]);
    }

    #[test]
    fn test_locate_all_keeps_module_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write(second.path(), "config/batch_jobs.yml", "second");
        write(first.path(), "config/batch_jobs.yml", "first");

        // Module order is the caller's, not the filesystem's
        let roots = vec![second.path().to_path_buf(), first.path().to_path_buf()];
        let sources = locate_all(&roots, &mut RecordingTracker::new()).unwrap();
        let contents: Vec<&str> = sources.iter().map(|s| s.text().unwrap()).collect();
        assert_eq!(contents, vec!["second", "first"]);
    }
}
