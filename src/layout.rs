use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use crate::types::UnitName;

const SYSTEM_SEARCH_PATH: &[&str] = &["/etc/systemd/system", "/lib/systemd/system", "/usr/lib/systemd/system"];
const USER_SEARCH_PATH: &[&str] = &["/etc/systemd/user", "/usr/lib/systemd/user"];

const DSH_ALSO_SUFFIX: &str = "dsh-also";

/// Which service manager tree is operated on.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Instance {
    System,
    User,
}

impl Instance {
    fn link_dir(self) -> &'static str {
        match self {
            Instance::System => "/etc/systemd/system",
            Instance::User => "/etc/systemd/user",
        }
    }

    fn search_path(self) -> &'static [&'static str] {
        match self {
            Instance::System => SYSTEM_SEARCH_PATH,
            Instance::User => USER_SEARCH_PATH,
        }
    }

    fn enabled_state_dir(self) -> &'static str {
        match self {
            Instance::System => "/var/lib/systemd/deb-systemd-helper-enabled",
            Instance::User => "/var/lib/systemd/deb-systemd-user-helper-enabled",
        }
    }

    fn masked_state_dir(self) -> &'static str {
        match self {
            Instance::System => "/var/lib/systemd/deb-systemd-helper-masked",
            Instance::User => "/var/lib/systemd/deb-systemd-user-helper-masked",
        }
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instance::System => write!(f, "system"),
            Instance::User => write!(f, "user"),
        }
    }
}

/// A unit file found on the search path.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UnitFile {
    /// Path as seen by the installed system, used as the symlink target.
    pub path: PathBuf,
    /// Path under the root, used for reading.
    pub rooted: PathBuf,
}

/// Paths of one instance, optionally below a root directory.
///
/// All paths handed out are logical (as seen from the installed system)
/// unless the method name says otherwise. Logical paths are turned into
/// real ones with [`Layout::rooted`].
#[derive(Debug, Clone)]
pub struct Layout {
    instance: Instance,
    root: PathBuf,
}

impl Layout {
    pub fn new<P: Into<PathBuf>>(instance: Instance, root: P) -> Self {
        Layout {
            instance,
            root: root.into(),
        }
    }

    /// Honors `DPKG_ROOT`, which dpkg sets when installing into a chroot-less root.
    pub fn from_env(instance: Instance) -> Self {
        let root = std::env::var_os("DPKG_ROOT").unwrap_or_else(OsString::new);
        Layout::new(instance, root)
    }

    pub fn instance(&self) -> Instance {
        self.instance
    }

    pub fn has_root(&self) -> bool {
        !self.root.as_os_str().is_empty() && self.root != Path::new("/")
    }

    pub fn rooted<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let path = path.as_ref();
        if !self.has_root() {
            return path.to_owned();
        }
        self.root.join(path.strip_prefix("/").unwrap_or(path))
    }

    pub fn link_dir(&self) -> &'static Path {
        Path::new(self.instance.link_dir())
    }

    /// `<link dir>/<relative>`, e.g. `multi-user.target.wants/foo.service`.
    pub fn link_path<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        self.link_dir().join(relative)
    }

    pub fn enabled_state_dir(&self) -> PathBuf {
        self.rooted(self.instance.enabled_state_dir())
    }

    pub fn masked_state_dir(&self) -> PathBuf {
        self.rooted(self.instance.masked_state_dir())
    }

    pub fn dsh_also_path(&self, unit: &UnitName) -> PathBuf {
        self.enabled_state_dir().join(format!("{}.{}", unit, DSH_ALSO_SUFFIX))
    }

    /// Marker mirroring a link below the enabled state dir.
    ///
    /// Returns `None` for links outside of the link dir.
    pub fn mirror_path(&self, link: &Path) -> Option<PathBuf> {
        let relative = link.strip_prefix(self.link_dir()).ok()?;
        if relative.as_os_str().is_empty() {
            return None;
        }
        Some(self.enabled_state_dir().join(relative))
    }

    pub fn mask_marker_path(&self, unit: &UnitName) -> PathBuf {
        self.masked_state_dir().join(unit.as_str())
    }

    fn search(&self, file_name: &str) -> Option<UnitFile> {
        self.instance.search_path()
            .iter()
            .map(|dir| Path::new(dir).join(file_name))
            .map(|path| {
                let rooted = self.rooted(&path);
                UnitFile { path, rooted }
            })
            // is_file follows symlinks, so masks pointing to /dev/null are skipped.
            .find(|file| file.rooted.is_file())
    }

    /// Looks the unit up on the search path, falling back to the template for instances.
    pub fn find_unit(&self, unit: &UnitName) -> Option<UnitFile> {
        self.search(unit.as_str())
            .or_else(|| unit.template().and_then(|template| self.search(template.as_str())))
    }
}
