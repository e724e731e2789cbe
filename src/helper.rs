//! The verbs of `deb-systemd-helper`.
//!
//! Every verb works on the filesystem only. Links the helper creates are
//! recorded in a `.dsh-also` file per unit and mirrored by empty marker
//! files, so that later verbs only ever remove what the helper created.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use crate::closure::{self, ClosureError, Link};
use crate::layout::{Instance, Layout};
use crate::state::{self, StateError, StateFile};
use crate::types::UnitName;

const MASK_TARGET: &str = "/dev/null";
const SYSTEMD_RUNTIME_DIR: &str = "/run/systemd/system";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Verb {
    Enable,
    Disable,
    Purge,
    Mask,
    Unmask,
    IsEnabled,
    WasEnabled,
    DebianInstalled,
    UpdateState,
    Reenable,
}

static VERBS: &[(&str, Verb)] = &[
    ("enable", Verb::Enable),
    ("disable", Verb::Disable),
    ("purge", Verb::Purge),
    ("mask", Verb::Mask),
    ("unmask", Verb::Unmask),
    ("is-enabled", Verb::IsEnabled),
    ("was-enabled", Verb::WasEnabled),
    ("debian-installed", Verb::DebianInstalled),
    ("update-state", Verb::UpdateState),
    ("reenable", Verb::Reenable),
];

impl Verb {
    pub fn names() -> impl Iterator<Item=&'static str> {
        VERBS.iter().map(|(name, _)| *name)
    }

    /// Query verbs only report through the exit status.
    pub fn is_query(self) -> bool {
        match self {
            Verb::IsEnabled | Verb::WasEnabled | Verb::DebianInstalled => true,
            _ => false,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = VERBS.iter()
            .find(|(_, verb)| verb == self)
            .map(|(name, _)| *name)
            .unwrap_or("?");
        write!(f, "{}", name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown action {0}")]
pub struct UnknownVerb(String);

impl std::str::FromStr for Verb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VERBS.iter()
            .find(|(name, _)| *name == s)
            .map(|(_, verb)| *verb)
            .ok_or_else(|| UnknownVerb(s.to_owned()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HelperError {
    #[error(transparent)]
    Closure(#[from] ClosureError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("unable to create directory {path}")]
    CreateDir { path: PathBuf, #[source] error: io::Error },
    #[error("unable to link {link} to {target}")]
    Symlink { link: PathBuf, target: PathBuf, #[source] error: io::Error },
    #[error("unable to remove {path}")]
    Remove { path: PathBuf, #[source] error: io::Error },
}

fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|metadata| metadata.file_type().is_symlink())
        .unwrap_or(false)
}

/// Applies verbs to units and remembers whether anything changed.
pub struct Helper {
    layout: Layout,
    changed: bool,
}

impl Helper {
    pub fn new(layout: Layout) -> Self {
        Helper {
            layout,
            changed: false,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Whether any symlink was created or removed so far.
    pub fn changed(&self) -> bool {
        self.changed
    }

    fn state_file(&self, unit: &UnitName) -> StateFile {
        StateFile::new(self.layout.dsh_also_path(unit))
    }

    fn create_link(&mut self, link: &Path, target: &Path) -> Result<(), HelperError> {
        let rooted = self.layout.rooted(link);
        if let Some(parent) = rooted.parent() {
            std::fs::create_dir_all(parent).map_err(|error| HelperError::CreateDir {
                path: parent.to_owned(),
                error,
            })?;
        }
        log::debug!("Linking {} to {}", link.display(), target.display());
        std::os::unix::fs::symlink(target, &rooted).map_err(|error| HelperError::Symlink {
            link: rooted.clone(),
            target: target.to_owned(),
            error,
        })?;
        self.changed = true;
        Ok(())
    }

    /// Removes `link` if it is a symlink. Returns `false` if it wasn't.
    fn remove_link(&mut self, link: &Path) -> Result<bool, HelperError> {
        let rooted = self.layout.rooted(link);
        if !is_symlink(&rooted) {
            log::debug!("{} is not a symlink, skipping", link.display());
            return Ok(false);
        }
        log::debug!("Removing {}", link.display());
        std::fs::remove_file(&rooted).map_err(|error| HelperError::Remove {
            path: rooted.clone(),
            error,
        })?;
        self.changed = true;
        Ok(true)
    }

    fn touch_mirror(&self, link: &Path) -> Result<(), HelperError> {
        if let Some(mirror) = self.layout.mirror_path(link) {
            state::touch_marker(&mirror)?;
        }
        Ok(())
    }

    fn remove_mirror(&self, link: &Path) -> Result<(), HelperError> {
        if let Some(mirror) = self.layout.mirror_path(link) {
            state::remove_marker(&mirror, &self.layout.enabled_state_dir())?;
        }
        Ok(())
    }

    fn links_exist(&self, links: &[PathBuf]) -> bool {
        links.iter().all(|link| {
            let exists = is_symlink(&self.layout.rooted(link));
            if !exists {
                log::debug!("Link {} is missing", link.display());
            }
            exists
        })
    }

    pub fn enable(&mut self, unit: &UnitName) -> Result<(), HelperError> {
        let links = closure::resolve(&self.layout, unit)?;
        let mut recorded = Vec::with_capacity(links.len());
        for Link { target, path } in &links {
            let rooted = self.layout.rooted(path);
            if is_symlink(&rooted) {
                log::debug!("{} already exists", path.display());
            } else if rooted.exists() {
                log::warn!("{} exists and is not a symlink, not touching it", path.display());
                continue;
            } else {
                self.create_link(path, target)?;
            }
            self.touch_mirror(path)?;
            recorded.push(path.as_path());
        }
        self.state_file(unit).record(recorded)?;
        Ok(())
    }

    pub fn disable(&mut self, unit: &UnitName) -> Result<(), HelperError> {
        for link in self.state_file(unit).entries()? {
            self.remove_link(&link)?;
        }
        Ok(())
    }

    pub fn purge(&mut self, unit: &UnitName) -> Result<(), HelperError> {
        let state = self.state_file(unit);
        for link in state.entries()? {
            self.remove_link(&link)?;
            self.remove_mirror(&link)?;
        }
        if state.remove()? {
            log::debug!("Removed {}", state.path().display());
        }
        Ok(())
    }

    pub fn reenable(&mut self, unit: &UnitName) -> Result<(), HelperError> {
        self.disable(unit)?;
        self.enable(unit)
    }

    /// Masks the unit unless something already occupies its place in the link dir.
    pub fn mask(&mut self, unit: &UnitName) -> Result<(), HelperError> {
        let link = self.layout.link_path(unit);
        if self.layout.rooted(&link).symlink_metadata().is_ok() {
            log::debug!("{} already exists, not masking", link.display());
            return Ok(());
        }
        self.create_link(&link, Path::new(MASK_TARGET))?;
        state::touch_marker(&self.layout.mask_marker_path(unit))?;
        Ok(())
    }

    /// Removes only masks created by [`Helper::mask`].
    pub fn unmask(&mut self, unit: &UnitName) -> Result<(), HelperError> {
        let marker = self.layout.mask_marker_path(unit);
        if !marker.exists() {
            log::debug!("{} was not masked by us", unit);
            return Ok(());
        }
        let link = self.layout.link_path(unit);
        let points_to_null = std::fs::read_link(self.layout.rooted(&link))
            .map(|target| target == Path::new(MASK_TARGET))
            .unwrap_or(false);
        if points_to_null {
            self.remove_link(&link)?;
        }
        state::remove_marker(&marker, &self.layout.masked_state_dir())?;
        Ok(())
    }

    pub fn is_enabled(&self, unit: &UnitName) -> Result<bool, HelperError> {
        let links = closure::resolve(&self.layout, unit)?
            .into_iter()
            .map(|link| link.path)
            .collect::<Vec<_>>();
        Ok(self.links_exist(&links))
    }

    /// True unless a link the helper created went missing, so fresh installs count as enabled.
    pub fn was_enabled(&self, unit: &UnitName) -> Result<bool, HelperError> {
        let entries = self.state_file(unit).entries()?;
        Ok(self.links_exist(&entries))
    }

    pub fn debian_installed(&self, unit: &UnitName) -> bool {
        self.state_file(unit).exists()
    }

    pub fn update_state(&mut self, unit: &UnitName) -> Result<(), HelperError> {
        let links = closure::resolve(&self.layout, unit)?;
        let state = self.state_file(unit);
        for old in state.entries()? {
            if links.iter().any(|link| link.path == old) {
                continue;
            }
            log::debug!("{} is no longer part of {}", old.display(), unit);
            self.remove_link(&old)?;
            self.remove_mirror(&old)?;
        }
        state.replace(links.iter().map(|link| link.path.as_path()))?;
        for link in &links {
            if is_symlink(&self.layout.rooted(&link.path)) {
                self.touch_mirror(&link.path)?;
            }
        }
        Ok(())
    }

    /// Runs `verb` on `unit`. Returns the answer of query verbs, `true` for the rest.
    pub fn run(&mut self, verb: Verb, unit: &UnitName) -> Result<bool, HelperError> {
        log::debug!("{} {} ({} instance)", verb, unit, self.layout.instance());
        match verb {
            Verb::Enable => self.enable(unit)?,
            Verb::Disable => self.disable(unit)?,
            Verb::Purge => self.purge(unit)?,
            Verb::Mask => self.mask(unit)?,
            Verb::Unmask => self.unmask(unit)?,
            Verb::Reenable => self.reenable(unit)?,
            Verb::UpdateState => self.update_state(unit)?,
            Verb::IsEnabled => return self.is_enabled(unit),
            Verb::WasEnabled => return self.was_enabled(unit),
            Verb::DebianInstalled => return Ok(self.debian_installed(unit)),
        }
        Ok(true)
    }

    /// Runs `verb` on every unit, printing `enabled`/`disabled` for `is-enabled` unless `quiet`.
    ///
    /// Errors are logged and don't stop the remaining units. Returns `true`
    /// only if every unit succeeded and every query held.
    pub fn run_all<W: io::Write>(&mut self, verb: Verb, units: &[UnitName], quiet: bool, mut out: W) -> bool {
        let mut success = true;
        for unit in units {
            match self.run(verb, unit) {
                Ok(answer) => {
                    if verb == Verb::IsEnabled && !quiet {
                        let state = if answer { "enabled" } else { "disabled" };
                        if let Err(error) = writeln!(out, "{}", state) {
                            log::error!("failed to write the result for {}: {}", unit, error);
                            success = false;
                        }
                    }
                    success &= answer;
                },
                Err(error) => {
                    log::error!("failed to {} {}: {}", verb, unit, crate::logging::error_chain(&error));
                    success = false;
                },
            }
        }
        success
    }

    fn reload_wanted(&self, runtime_dir: &Path) -> bool {
        self.changed
            && self.layout.instance() == Instance::System
            && !self.layout.has_root()
            && runtime_dir.is_dir()
    }

    /// Reloading only makes sense for the running system manager of this very root.
    pub fn needs_reload(&self) -> bool {
        self.reload_wanted(Path::new(SYSTEMD_RUNTIME_DIR))
    }

    pub fn reload_if_needed(&self) {
        if !self.needs_reload() {
            return;
        }
        log::debug!("Running systemctl daemon-reload");
        match std::process::Command::new("systemctl").arg("daemon-reload").status() {
            Ok(status) if status.success() => (),
            Ok(status) => log::warn!("systemctl daemon-reload failed with {}", status),
            Err(error) => log::warn!("failed to run systemctl daemon-reload: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Helper, Verb};
    use crate::layout::{Instance, Layout};
    use crate::types::UnitName;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const WANTS: &str = "etc/systemd/system/multi-user.target.wants/foo.service";
    const ALIAS: &str = "etc/systemd/system/food.service";
    const DSH_ALSO: &str = "var/lib/systemd/deb-systemd-helper-enabled/foo.service.dsh-also";
    const MIRROR: &str = "var/lib/systemd/deb-systemd-helper-enabled/multi-user.target.wants/foo.service";

    struct Root {
        dir: TempDir,
    }

    impl Root {
        fn new() -> Self {
            Root {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn unit(&self, name: &str, contents: &str) -> &Self {
            let dir = self.dir.path().join("lib/systemd/system");
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(name), contents).unwrap();
            self
        }

        fn remove_unit(&self, name: &str) {
            std::fs::remove_file(self.dir.path().join("lib/systemd/system").join(name)).unwrap();
        }

        fn path(&self, relative: &str) -> PathBuf {
            self.dir.path().join(relative)
        }

        fn is_link(&self, relative: &str) -> bool {
            self.path(relative).symlink_metadata().map(|m| m.file_type().is_symlink()).unwrap_or(false)
        }

        fn helper(&self) -> Helper {
            Helper::new(Layout::new(Instance::System, self.dir.path()))
        }
    }

    fn foo() -> UnitName {
        "foo.service".parse().unwrap()
    }

    const FOO: &str = "[Unit]\nDescription=foo\n\n[Install]\nWantedBy=multi-user.target\nAlias=food.service\n";

    #[test]
    fn verb_names_round_trip() {
        for name in Verb::names() {
            let verb: Verb = name.parse().unwrap();
            assert_eq!(verb.to_string(), name);
        }
        assert!("start".parse::<Verb>().is_err());
        assert!(Verb::WasEnabled.is_query());
        assert!(!Verb::Enable.is_query());
    }

    #[test]
    fn enable_creates_links_and_state() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        let mut helper = root.helper();
        helper.enable(&foo()).unwrap();

        assert!(helper.changed());
        assert!(root.is_link(WANTS));
        assert!(root.is_link(ALIAS));
        assert_eq!(std::fs::read_link(root.path(WANTS)).unwrap(), Path::new("/lib/systemd/system/foo.service"));
        assert!(root.path(MIRROR).is_file());
        let state = std::fs::read_to_string(root.path(DSH_ALSO)).unwrap();
        assert_eq!(state, "/etc/systemd/system/multi-user.target.wants/foo.service\n/etc/systemd/system/food.service\n");
        assert!(helper.is_enabled(&foo()).unwrap());
        assert!(helper.was_enabled(&foo()).unwrap());
        assert!(helper.debian_installed(&foo()));
    }

    #[test]
    fn enable_is_idempotent() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        root.helper().enable(&foo()).unwrap();
        let mut helper = root.helper();
        helper.enable(&foo()).unwrap();
        assert!(!helper.changed());
        let state = std::fs::read_to_string(root.path(DSH_ALSO)).unwrap();
        assert_eq!(state.lines().count(), 2);
    }

    #[test]
    fn enable_leaves_regular_files_alone() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        std::fs::create_dir_all(root.path("etc/systemd/system")).unwrap();
        std::fs::write(root.path(ALIAS), "admin copy").unwrap();
        root.helper().enable(&foo()).unwrap();
        assert_eq!(std::fs::read_to_string(root.path(ALIAS)).unwrap(), "admin copy");
        let state = std::fs::read_to_string(root.path(DSH_ALSO)).unwrap();
        assert!(!state.contains("food.service"));
    }

    #[test]
    fn enable_static_unit_marks_installed() {
        let root = Root::new();
        root.unit("foo.service", "[Service]\nExecStart=/bin/true\n");
        let mut helper = root.helper();
        helper.enable(&foo()).unwrap();
        assert!(!helper.changed());
        assert!(helper.debian_installed(&foo()));
    }

    #[test]
    fn enable_missing_unit_fails() {
        let root = Root::new();
        assert!(root.helper().enable(&foo()).is_err());
        assert!(root.helper().is_enabled(&foo()).is_err());
    }

    #[test]
    fn disable_keeps_state_and_was_enabled_turns_false() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        root.helper().enable(&foo()).unwrap();
        let mut helper = root.helper();
        helper.disable(&foo()).unwrap();
        assert!(helper.changed());
        assert!(!root.is_link(WANTS));
        assert!(!root.is_link(ALIAS));
        assert!(helper.debian_installed(&foo()));
        assert!(!helper.was_enabled(&foo()).unwrap());
        assert!(!helper.is_enabled(&foo()).unwrap());
        assert!(root.path(MIRROR).is_file());
    }

    #[test]
    fn disable_does_not_touch_foreign_links() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        std::fs::create_dir_all(root.path("etc/systemd/system/multi-user.target.wants")).unwrap();
        std::os::unix::fs::symlink("/lib/systemd/system/foo.service", root.path(WANTS)).unwrap();
        // never enabled through the helper, so there is no state
        root.helper().disable(&foo()).unwrap();
        assert!(root.is_link(WANTS));
    }

    #[test]
    fn purge_removes_everything() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        root.helper().enable(&foo()).unwrap();
        root.remove_unit("foo.service");
        let mut helper = root.helper();
        helper.purge(&foo()).unwrap();
        assert!(!root.is_link(WANTS));
        assert!(!root.is_link(ALIAS));
        assert!(!root.path(DSH_ALSO).exists());
        assert!(!root.path(MIRROR).exists());
        assert!(!root.path("var/lib/systemd/deb-systemd-helper-enabled/multi-user.target.wants").exists());
        assert!(!helper.debian_installed(&foo()));
        assert!(helper.was_enabled(&foo()).unwrap());
    }

    #[test]
    fn reenable_restores_links() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        root.helper().enable(&foo()).unwrap();
        std::fs::remove_file(root.path(ALIAS)).unwrap();
        let mut helper = root.helper();
        assert!(!helper.is_enabled(&foo()).unwrap());
        helper.reenable(&foo()).unwrap();
        assert!(root.is_link(WANTS));
        assert!(root.is_link(ALIAS));
    }

    #[test]
    fn mask_and_unmask() {
        let root = Root::new();
        let mask = "etc/systemd/system/foo.service";
        let marker = "var/lib/systemd/deb-systemd-helper-masked/foo.service";
        let mut helper = root.helper();
        helper.mask(&foo()).unwrap();
        assert_eq!(std::fs::read_link(root.path(mask)).unwrap(), Path::new("/dev/null"));
        assert!(root.path(marker).is_file());

        helper.unmask(&foo()).unwrap();
        assert!(!root.is_link(mask));
        assert!(!root.path(marker).exists());
        assert!(root.path("var/lib/systemd/deb-systemd-helper-masked").is_dir());
    }

    #[test]
    fn admin_masks_are_preserved() {
        let root = Root::new();
        let mask = "etc/systemd/system/foo.service";
        std::fs::create_dir_all(root.path("etc/systemd/system")).unwrap();
        std::os::unix::fs::symlink("/dev/null", root.path(mask)).unwrap();
        let mut helper = root.helper();
        helper.mask(&foo()).unwrap();
        assert!(!root.path("var/lib/systemd/deb-systemd-helper-masked/foo.service").exists());
        helper.unmask(&foo()).unwrap();
        assert!(root.is_link(mask));
        assert!(!helper.changed());
    }

    #[test]
    fn mask_skips_admin_unit_copies() {
        let root = Root::new();
        std::fs::create_dir_all(root.path("etc/systemd/system")).unwrap();
        std::fs::write(root.path("etc/systemd/system/foo.service"), "[Service]\n").unwrap();
        root.helper().mask(&foo()).unwrap();
        assert!(!root.is_link("etc/systemd/system/foo.service"));
    }

    #[test]
    fn update_state_drops_stale_links() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        root.helper().enable(&foo()).unwrap();
        root.unit("foo.service", "[Install]\nWantedBy=graphical.target\n");
        let mut helper = root.helper();
        helper.update_state(&foo()).unwrap();
        assert!(!root.is_link(WANTS));
        assert!(!root.is_link(ALIAS));
        assert!(!root.path(MIRROR).exists());
        // update-state does not enable
        assert!(!root.is_link("etc/systemd/system/graphical.target.wants/foo.service"));
        let state = std::fs::read_to_string(root.path(DSH_ALSO)).unwrap();
        assert_eq!(state, "/etc/systemd/system/graphical.target.wants/foo.service\n");
        assert!(!helper.was_enabled(&foo()).unwrap());
    }

    #[test]
    fn install_remove_purge_cycle() {
        let root = Root::new();
        root.unit("foo.service", FOO);

        // postinst of a fresh install
        let mut helper = root.helper();
        helper.unmask(&foo()).unwrap();
        assert!(helper.was_enabled(&foo()).unwrap());
        helper.enable(&foo()).unwrap();

        // postrm remove: the unit file is gone
        root.remove_unit("foo.service");
        let mut helper = root.helper();
        helper.mask(&foo()).unwrap();
        assert!(root.is_link("etc/systemd/system/foo.service"));

        // postrm purge
        helper.purge(&foo()).unwrap();
        helper.unmask(&foo()).unwrap();
        assert!(!root.is_link("etc/systemd/system/foo.service"));
        assert!(!root.is_link(WANTS));
        assert!(!root.path(DSH_ALSO).exists());
    }

    #[test]
    fn run_dispatches_queries() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        let mut helper = root.helper();
        assert!(!helper.run(Verb::DebianInstalled, &foo()).unwrap());
        assert!(!helper.run(Verb::IsEnabled, &foo()).unwrap());
        assert!(helper.run(Verb::Enable, &foo()).unwrap());
        assert!(helper.run(Verb::IsEnabled, &foo()).unwrap());
        assert!(helper.run(Verb::DebianInstalled, &foo()).unwrap());
    }

    #[test]
    fn rooted_layouts_never_reload() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        let mut helper = root.helper();
        helper.enable(&foo()).unwrap();
        assert!(helper.changed());
        assert!(!helper.needs_reload());
    }

    #[test]
    fn reload_condition() {
        let runtime = tempfile::tempdir().unwrap();
        let missing = runtime.path().join("missing");
        let mut helper = Helper::new(Layout::new(Instance::System, ""));
        assert!(!helper.reload_wanted(runtime.path()));
        helper.changed = true;
        assert!(helper.reload_wanted(runtime.path()));
        assert!(!helper.reload_wanted(&missing));

        let mut user = Helper::new(Layout::new(Instance::User, ""));
        user.changed = true;
        assert!(!user.reload_wanted(runtime.path()));
        let mut rooted = Helper::new(Layout::new(Instance::System, "/target"));
        rooted.changed = true;
        assert!(!rooted.reload_wanted(runtime.path()));
    }

    fn run_all(helper: &mut Helper, verb: Verb, units: &[&str], quiet: bool) -> (bool, String) {
        let units = units.iter().map(|unit| unit.parse().unwrap()).collect::<Vec<UnitName>>();
        let mut out = Vec::new();
        let success = helper.run_all(verb, &units, quiet, &mut out);
        (success, String::from_utf8(out).unwrap())
    }

    #[test]
    fn run_all_combines_answers() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        root.unit("bar.service", "[Install]\nWantedBy=multi-user.target\n");
        let mut helper = root.helper();
        helper.enable(&foo()).unwrap();

        assert_eq!(run_all(&mut helper, Verb::IsEnabled, &["foo"], false), (true, "enabled\n".to_owned()));
        assert_eq!(run_all(&mut helper, Verb::IsEnabled, &["foo", "bar"], false), (false, "enabled\ndisabled\n".to_owned()));
        assert_eq!(run_all(&mut helper, Verb::IsEnabled, &["foo", "bar"], true), (false, String::new()));
        assert_eq!(run_all(&mut helper, Verb::DebianInstalled, &["bar", "foo"], false), (false, String::new()));
    }

    #[test]
    fn run_all_continues_after_errors() {
        let root = Root::new();
        root.unit("foo.service", FOO);
        let mut helper = root.helper();
        let (success, out) = run_all(&mut helper, Verb::Enable, &["missing", "foo"], false);
        assert!(!success);
        assert!(out.is_empty());
        assert!(root.is_link(WANTS));
        assert_eq!(run_all(&mut helper, Verb::IsEnabled, &["foo", "missing"], false), (false, "enabled\n".to_owned()));
        assert_eq!(run_all(&mut helper, Verb::Disable, &["foo"], false), (true, String::new()));
        assert!(!root.is_link(WANTS));
    }

    #[test]
    fn user_instance() {
        let root = Root::new();
        let dir = root.path("usr/lib/systemd/user");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("foo.service"), "[Install]\nWantedBy=default.target\n").unwrap();
        let mut helper = Helper::new(Layout::new(Instance::User, root.dir.path()));
        helper.enable(&foo()).unwrap();
        assert!(root.is_link("etc/systemd/user/default.target.wants/foo.service"));
        assert!(root.path("var/lib/systemd/deb-systemd-user-helper-enabled/foo.service.dsh-also").is_file());
        assert!(!helper.needs_reload());
    }
}
