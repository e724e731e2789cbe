//! Flat state files kept below `/var/lib/systemd`.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy)]
enum Action {
    Read,
    Write,
    Remove,
    CreateDir,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::Read => write!(f, "read"),
            Action::Write => write!(f, "write"),
            Action::Remove => write!(f, "remove"),
            Action::CreateDir => write!(f, "create directory"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to {action} {path}")]
pub struct StateError {
    action: Action,
    path: PathBuf,
    #[source]
    error: io::Error,
}

impl StateError {
    fn with_path<P: Into<PathBuf>>(action: Action, path: P) -> impl FnOnce(io::Error) -> Self {
        move |error| StateError {
            action,
            path: path.into(),
            error,
        }
    }
}

fn create_parent(path: &Path) -> Result<(), StateError> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(StateError::with_path(Action::CreateDir, parent)),
        None => Ok(()),
    }
}

/// The list of links the helper created for one unit, one path per line.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        StateFile {
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Missing file means no entries.
    pub fn entries(&self) -> Result<Vec<PathBuf>, StateError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(ref error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(StateError::with_path(Action::Read, &self.path)(error)),
        };
        let mut entries = Vec::new();
        for line in io::BufReader::new(file).lines() {
            let line = line.map_err(StateError::with_path(Action::Read, &self.path))?;
            if !line.is_empty() {
                entries.push(PathBuf::from(line));
            }
        }
        Ok(entries)
    }

    /// Appends the links not recorded yet. Creates the file even if there is nothing to add.
    pub fn record<'a, I>(&self, links: I) -> Result<(), StateError> where I: IntoIterator<Item=&'a Path> {
        let mut entries = self.entries()?;
        for link in links {
            if !entries.iter().any(|entry| entry == link) {
                entries.push(link.to_owned());
            }
        }
        self.write(&entries)
    }

    pub fn replace<'a, I>(&self, links: I) -> Result<(), StateError> where I: IntoIterator<Item=&'a Path> {
        let entries = links.into_iter().map(Path::to_owned).collect::<Vec<_>>();
        self.write(&entries)
    }

    /// Returns `false` if there was nothing to remove.
    pub fn remove(&self) -> Result<bool, StateError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(ref error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(StateError::with_path(Action::Remove, &self.path)(error)),
        }
    }

    // Readers never see a partially written file.
    fn write(&self, entries: &[PathBuf]) -> Result<(), StateError> {
        create_parent(&self.path)?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        (|| -> io::Result<()> {
            let mut temp = tempfile::NamedTempFile::new_in(dir)?;
            {
                let mut out = io::BufWriter::new(temp.as_file_mut());
                for entry in entries {
                    writeln!(out, "{}", entry.display())?;
                }
                out.flush()?;
            }
            temp.persist(&self.path).map_err(|error| error.error)?;
            Ok(())
        })().map_err(StateError::with_path(Action::Write, &self.path))
    }
}

/// Creates an empty marker file. Returns `true` if it didn't exist.
pub fn touch_marker(path: &Path) -> Result<bool, StateError> {
    if path.exists() {
        return Ok(false);
    }
    create_parent(path)?;
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(StateError::with_path(Action::Write, path))?;
    Ok(true)
}

/// Removes a marker and the directories it leaves empty, up to but excluding `stop_at`.
pub fn remove_marker(path: &Path, stop_at: &Path) -> Result<bool, StateError> {
    match fs::remove_file(path) {
        Ok(()) => (),
        Err(ref error) if error.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(error) => return Err(StateError::with_path(Action::Remove, path)(error)),
    }
    if let Some(parent) = path.parent() {
        prune_empty_dirs(parent, stop_at);
    }
    Ok(true)
}

/// Removes `dir` and its ancestors while they are empty, stopping at `stop_at`.
pub fn prune_empty_dirs(dir: &Path, stop_at: &Path) {
    let mut current = Some(dir);
    while let Some(dir) = current {
        if dir == stop_at || !dir.starts_with(stop_at) {
            break;
        }
        let is_empty = fs::read_dir(dir).map(|mut entries| entries.next().is_none()).unwrap_or(false);
        if !is_empty || fs::remove_dir(dir).is_err() {
            break;
        }
        log::debug!("Removed empty directory {}", dir.display());
        current = dir.parent();
    }
}
