//! Build time view of a source package, the way debhelper tools see it.

use std::io;
use std::path::{Path, PathBuf};
use either::Either;
use crate::types::PackageName;

pub use control::{Architecture, BinaryPackage, Control, ControlError};

mod control;

/// Which binary packages a tool acts on.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub packages: Vec<PackageName>,
    pub excluded: Vec<PackageName>,
    pub indep: bool,
    pub arch: bool,
}

impl Selection {
    fn is_default(&self) -> bool {
        self.packages.is_empty() && !self.indep && !self.arch
    }

    fn includes(&self, package: &BinaryPackage) -> bool {
        self.packages.contains(&package.name)
            || (self.indep && package.is_arch_indep())
            || (self.arch && !package.is_arch_indep())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DebhelperError {
    #[error("failed to load package description")]
    Control(#[from] ControlError),
    #[error("package {0} is not in debian/control")]
    UnknownPackage(PackageName),
    #[error("failed to install {from} as {dest}")]
    Install { from: PathBuf, dest: PathBuf, #[source] error: io::Error },
}

pub struct Debhelper {
    debian_dir: PathBuf,
    control: Control,
    no_act: bool,
}

impl Debhelper {
    pub fn new<P: Into<PathBuf>>(debian_dir: P, control: Control) -> Self {
        Debhelper {
            debian_dir: debian_dir.into(),
            control,
            no_act: false,
        }
    }

    /// Loads `<debian_dir>/control`.
    pub fn load<P: Into<PathBuf>>(debian_dir: P) -> Result<Self, DebhelperError> {
        let debian_dir = debian_dir.into();
        let control = Control::load(debian_dir.join("control"))?;
        Ok(Self::new(debian_dir, control))
    }

    pub fn no_act(mut self, no_act: bool) -> Self {
        self.no_act = no_act;
        self
    }

    pub fn is_no_act(&self) -> bool {
        self.no_act
    }

    pub fn debian_dir(&self) -> &Path {
        &self.debian_dir
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    /// Packages to act on. Explicitly requested packages must exist.
    pub fn packages<'a>(&'a self, selection: &'a Selection) -> Result<impl Iterator<Item=&'a BinaryPackage> + 'a, DebhelperError> {
        for requested in selection.packages.iter().chain(&selection.excluded) {
            if !self.control.packages().iter().any(|package| package.name == *requested) {
                return Err(DebhelperError::UnknownPackage(requested.clone()));
            }
        }

        let packages = if selection.is_default() {
            Either::Left(self.control.packages().iter())
        } else {
            Either::Right(self.control.packages().iter().filter(move |package| selection.includes(package)))
        };
        Ok(packages.filter(move |package| !selection.excluded.contains(&package.name)))
    }

    /// `debian/<package>` where the package contents are staged.
    pub fn tmpdir(&self, package: &PackageName) -> PathBuf {
        package.tmpdir(&self.debian_dir)
    }

    fn is_main_package(&self, package: &PackageName) -> bool {
        self.control.main_package().map_or(false, |main| main.name == *package)
    }

    /// Finds `debian/<package>.[<name>.]<suffix>`.
    ///
    /// The main package also accepts the file without the package prefix.
    pub fn pkgfile(&self, package: &PackageName, name: Option<&str>, suffix: &str) -> Option<PathBuf> {
        let mut candidates = Vec::with_capacity(4);
        if let Some(name) = name {
            candidates.push(self.debian_dir.join(format!("{}.{}.{}", package, name, suffix)));
            if self.is_main_package(package) {
                candidates.push(self.debian_dir.join(format!("{}.{}", name, suffix)));
            }
        } else {
            candidates.push(package.debian_file(&self.debian_dir, suffix));
            if self.is_main_package(package) {
                candidates.push(self.debian_dir.join(suffix));
            }
        }
        candidates.into_iter().find(|candidate| candidate.is_file())
    }

    /// Copies `source` to `dest` with mode 0644, creating parent directories.
    pub fn install_file(&self, source: &Path, dest: &Path) -> Result<(), DebhelperError> {
        if self.no_act {
            log::info!("would install {} to {}", source.display(), dest.display());
            return Ok(());
        }
        log::info!("installing {} to {}", source.display(), dest.display());
        (|| -> io::Result<()> {
            use std::os::unix::fs::PermissionsExt;

            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(source, dest)?;
            std::fs::set_permissions(dest, std::fs::Permissions::from_mode(0o644))
        })().map_err(|error| DebhelperError::Install { from: source.to_owned(), dest: dest.to_owned(), error })
    }
}

#[cfg(test)]
mod tests {
    use super::{Control, Debhelper, Selection};
    use std::path::Path;

    const CONTROL: &str = "\
Source: foo

Package: foo
Architecture: any

Package: foo-common
Architecture: all

Package: foo-tools
Architecture: amd64 arm64
";

    fn debhelper(dir: &Path) -> Debhelper {
        let control = Control::parse(CONTROL, Path::new("debian/control")).unwrap();
        Debhelper::new(dir, control)
    }

    fn selected(debhelper: &Debhelper, selection: &Selection) -> Vec<String> {
        debhelper.packages(selection).unwrap().map(|package| package.name.to_string()).collect()
    }

    fn names(names: &[&str]) -> Vec<crate::types::PackageName> {
        names.iter().map(|name| name.parse().unwrap()).collect()
    }

    macro_rules! selection_case {
        ($name:ident, $selection:expr, [$($expected:expr),*]) => {
            #[test]
            fn $name() {
                let dir = tempfile::tempdir().unwrap();
                let expected: &[&str] = &[$($expected),*];
                assert_eq!(selected(&debhelper(dir.path()), &$selection), expected);
            }
        }
    }

    selection_case!(select_all, Selection::default(), ["foo", "foo-common", "foo-tools"]);
    selection_case!(select_indep, Selection { indep: true, ..Default::default() }, ["foo-common"]);
    selection_case!(select_arch, Selection { arch: true, ..Default::default() }, ["foo", "foo-tools"]);
    selection_case!(select_package, Selection { packages: names(&["foo-tools"]), ..Default::default() }, ["foo-tools"]);
    selection_case!(select_excluded, Selection { excluded: names(&["foo"]), ..Default::default() }, ["foo-common", "foo-tools"]);
    selection_case!(select_indep_and_package, Selection { indep: true, packages: names(&["foo"]), ..Default::default() }, ["foo", "foo-common"]);

    #[test]
    fn unknown_package() {
        let dir = tempfile::tempdir().unwrap();
        let debhelper = debhelper(dir.path());
        let selection = Selection { packages: names(&["bar"]), ..Default::default() };
        assert!(debhelper.packages(&selection).is_err());
    }

    #[test]
    fn pkgfile_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let debhelper = debhelper(dir.path());
        let foo = "foo".parse().unwrap();
        let common = "foo-common".parse().unwrap();
        std::fs::write(dir.path().join("service"), "").unwrap();
        std::fs::write(dir.path().join("foo-common.service"), "").unwrap();
        std::fs::write(dir.path().join("foo.bar.socket"), "").unwrap();
        std::fs::write(dir.path().join("baz.timer"), "").unwrap();

        assert_eq!(debhelper.pkgfile(&foo, None, "service"), Some(dir.path().join("service")));
        assert_eq!(debhelper.pkgfile(&common, None, "service"), Some(dir.path().join("foo-common.service")));
        assert_eq!(debhelper.pkgfile(&foo, Some("bar"), "socket"), Some(dir.path().join("foo.bar.socket")));
        assert_eq!(debhelper.pkgfile(&foo, Some("baz"), "timer"), Some(dir.path().join("baz.timer")));
        assert_eq!(debhelper.pkgfile(&common, Some("baz"), "timer"), None);
        assert_eq!(debhelper.pkgfile(&common, None, "socket"), None);
    }

    #[test]
    fn install_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let debhelper = debhelper(dir.path());
        let source = dir.path().join("foo.service");
        std::fs::write(&source, "[Unit]\n").unwrap();
        std::fs::set_permissions(&source, std::fs::Permissions::from_mode(0o755)).unwrap();
        let dest = dir.path().join("foo/lib/systemd/system/foo.service");
        debhelper.install_file(&source, &dest).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "[Unit]\n");
        assert_eq!(std::fs::metadata(&dest).unwrap().permissions().mode() & 0o777, 0o644);
    }
}
