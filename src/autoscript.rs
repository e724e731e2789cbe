//! Maintainer script fragments in the debhelper format.
//!
//! Fragments are collected in `debian/<package>.<script>.debhelper`, which
//! `dh_installdeb` later substitutes for `#DEBHELPER#`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use crate::template::{self, Query, TemplateError};
use crate::types::PackageName;

pub const POSTINST_ENABLE: &str = "\
if [ \"$1\" = \"configure\" ] || [ \"$1\" = \"abort-upgrade\" ] || [ \"$1\" = \"abort-deconfigure\" ] || [ \"$1\" = \"abort-remove\" ] ; then
	# This will only remove masks created by deb-systemd-helper on package removal.
	deb-systemd-helper unmask {unit_file} >/dev/null || true

	# was-enabled defaults to true, so new installations run enable.
	if deb-systemd-helper --quiet was-enabled {unit_file}; then
		# Enables the unit on first installation, creates new
		# symlinks on upgrades if the unit file has changed.
		deb-systemd-helper enable {unit_file} >/dev/null || true
	else
		# Update the statefile to add new symlinks (if any), which need to be
		# cleaned up on purge. Also remove old symlinks.
		deb-systemd-helper update-state {unit_file} >/dev/null || true
	fi
fi
";

pub const POSTINST_DONT_ENABLE: &str = "\
if [ \"$1\" = \"configure\" ] || [ \"$1\" = \"abort-upgrade\" ] || [ \"$1\" = \"abort-deconfigure\" ] || [ \"$1\" = \"abort-remove\" ] ; then
	if deb-systemd-helper debian-installed {unit_file}; then
		# This will only remove masks created by deb-systemd-helper on package removal.
		deb-systemd-helper unmask {unit_file} >/dev/null || true

		if deb-systemd-helper --quiet was-enabled {unit_file}; then
			# Create new symlinks, if any.
			deb-systemd-helper enable {unit_file} >/dev/null || true
		fi
	fi

	# Update the statefile to add new symlinks (if any), which need to be cleaned
	# up on purge. Also remove old symlinks.
	deb-systemd-helper update-state {unit_file} >/dev/null || true
fi
";

pub const POSTRM: &str = "\
if [ \"$1\" = \"remove\" ]; then
	if [ -x \"/usr/bin/deb-systemd-helper\" ]; then
		deb-systemd-helper mask {unit_files} >/dev/null || true
	fi
fi

if [ \"$1\" = \"purge\" ]; then
	if [ -x \"/usr/bin/deb-systemd-helper\" ]; then
		deb-systemd-helper purge {unit_files} >/dev/null || true
		deb-systemd-helper unmask {unit_files} >/dev/null || true
	fi
fi
";

pub const POSTINST_TMPFILES: &str = "\
if [ \"$1\" = \"configure\" ] || [ \"$1\" = \"abort-upgrade\" ] || [ \"$1\" = \"abort-deconfigure\" ] || [ \"$1\" = \"abort-remove\" ] ; then
	systemd-tmpfiles --create {tmpfiles} >/dev/null || true
fi
";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Script {
    Postinst,
    Postrm,
}

impl Script {
    pub fn name(self) -> &'static str {
        match self {
            Script::Postinst => "postinst",
            Script::Postrm => "postrm",
        }
    }

    // Removal fragments run in reverse order of installation.
    fn prepends(self) -> bool {
        self == Script::Postrm
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AutoscriptError {
    #[error("invalid snippet for {script} of {package}")]
    Template { script: &'static str, package: String, #[source] error: TemplateError },
    #[error("failed to update {path}")]
    Io { path: PathBuf, #[source] error: io::Error },
}

impl AutoscriptError {
    fn io<P: Into<PathBuf>>(path: P) -> impl FnOnce(io::Error) -> Self {
        move |error| AutoscriptError::Io {
            path: path.into(),
            error,
        }
    }
}

/// Adds fragments on behalf of one debhelper tool.
pub struct Autoscripts<'a> {
    debian_dir: &'a Path,
    tool: &'a str,
    version: &'a str,
    no_act: bool,
}

impl<'a> Autoscripts<'a> {
    pub fn new(debian_dir: &'a Path, tool: &'a str, version: &'a str) -> Self {
        Autoscripts {
            debian_dir,
            tool,
            version,
            no_act: false,
        }
    }

    /// Only log what would be written.
    pub fn no_act(mut self, no_act: bool) -> Self {
        self.no_act = no_act;
        self
    }

    pub fn debian_dir(&self) -> &Path {
        self.debian_dir
    }

    pub fn script_path(&self, package: &PackageName, script: Script) -> PathBuf {
        package.debian_file(self.debian_dir, &format!("{}.debhelper", script.name()))
    }

    fn block<V: Query>(&self, package: &PackageName, script: Script, snippet: &str, vars: V) -> Result<String, AutoscriptError> {
        let body = template::render(snippet, vars).map_err(|error| AutoscriptError::Template {
            script: script.name(),
            package: package.to_string(),
            error,
        })?;
        Ok(format!("# Automatically added by {}/{}\n{}# End automatically added section\n", self.tool, self.version, body))
    }

    /// Expands `snippet` with `vars` and adds it to `script` of `package`.
    pub fn add<V: Query>(&self, package: &PackageName, script: Script, snippet: &str, vars: V) -> Result<(), AutoscriptError> {
        let block = self.block(package, script, snippet, vars)?;
        let path = self.script_path(package, script);
        if self.no_act {
            log::info!("would add to {}:\n{}", path.display(), block);
            return Ok(());
        }
        log::info!("adding {} fragment to {}", script.name(), path.display());

        (|| -> io::Result<()> {
            if script.prepends() {
                let existing = match std::fs::read_to_string(&path) {
                    Ok(existing) => existing,
                    Err(ref error) if error.kind() == io::ErrorKind::NotFound => String::new(),
                    Err(error) => return Err(error),
                };
                std::fs::write(&path, block + &existing)
            } else {
                let mut out = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)?;
                out.write_all(block.as_bytes())
            }
        })().map_err(AutoscriptError::io(&path))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to update substitution variables in {path}")]
pub struct SubstvarError {
    path: PathBuf,
    #[source]
    error: io::Error,
}

fn merge_substvar(contents: &str, name: &str, value: &str) -> String {
    let prefix = format!("{}=", name);
    let mut found = false;
    let mut out = String::with_capacity(contents.len() + prefix.len() + value.len() + 1);
    for line in contents.lines() {
        match line.strip_prefix(&prefix) {
            Some(existing) => {
                found = true;
                let present = existing.split(',').any(|item| item.trim() == value);
                if present || existing.trim().is_empty() {
                    out.push_str(&prefix);
                    out.push_str(if present { existing } else { value });
                } else {
                    out.push_str(line);
                    out.push_str(", ");
                    out.push_str(value);
                }
            },
            None => out.push_str(line),
        }
        out.push('\n');
    }
    if !found {
        out.push_str(&prefix);
        out.push_str(value);
        out.push('\n');
    }
    out
}

/// Adds `value` to the substitution variable `name` in `debian/<package>.substvars`.
pub fn add_substvar(debian_dir: &Path, package: &PackageName, name: &str, value: &str, no_act: bool) -> Result<(), SubstvarError> {
    let path = package.debian_file(debian_dir, "substvars");
    if no_act {
        log::info!("would add {}={} to {}", name, value, path.display());
        return Ok(());
    }
    (|| -> io::Result<()> {
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(ref error) if error.kind() == io::ErrorKind::NotFound => String::new(),
            Err(error) => return Err(error),
        };
        let merged = merge_substvar(&contents, name, value);
        if merged != contents {
            log::info!("adding {}={} to {}", name, value, path.display());
            std::fs::write(&path, merged)?;
        }
        Ok(())
    })().map_err(|error| SubstvarError { path: path.clone(), error })
}
