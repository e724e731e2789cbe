//! Build time half: install units shipped in `debian/` and generate the
//! maintainer script fragments calling `deb-systemd-helper`.

use std::path::{Path, PathBuf};
use crate::Map;
use crate::autoscript::{self, AutoscriptError, Autoscripts, Script};
use crate::codegen::ShellQuoted;
use crate::debhelper::{BinaryPackage, Debhelper, DebhelperError, Selection};
use crate::types::UnitName;
use crate::unit::{InstallInfo, LoadUnitError};

pub const TOOL_NAME: &str = "dh_systemd_enable";

/// Unit types looked up as `debian/<package>.<suffix>`.
pub const UNIT_SUFFIXES: &[&str] = &["service", "target", "socket", "path", "timer", "mount", "automount"];

pub const SUBSTVAR_NAME: &str = "misc:Depends";
pub const SUBSTVAR_VALUE: &str = "init-system-helpers (>= 1.18~)";

const UNIT_DIRS: &[&str] = &["lib/systemd/system", "usr/lib/systemd/system"];
const TMPFILES_DIR: &str = "usr/lib/tmpfiles.d";

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub selection: Selection,
    /// Only update the state on upgrades, never enable.
    pub no_enable: bool,
    /// Name used instead of the package name for packaging files.
    pub name: Option<String>,
    pub no_scripts: bool,
    /// Unit files relative to the package tmpdir.
    pub units: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnableError {
    #[error(transparent)]
    Debhelper(#[from] DebhelperError),
    #[error(transparent)]
    Autoscript(#[from] AutoscriptError),
    #[error(transparent)]
    Substvar(#[from] autoscript::SubstvarError),
    #[error("failed to inspect unit")]
    LoadUnit(#[from] LoadUnitError),
    #[error("failed to list {path}")]
    ListUnits { path: PathBuf, #[source] error: std::io::Error },
    #[error("unit file {path} doesn't exist")]
    MissingUnit { path: PathBuf },
    #[error("{path} is not a valid unit file name")]
    InvalidUnitName { path: PathBuf, #[source] error: crate::types::UnitNameError },
}

/// What was done for a single package.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct PackageReport {
    pub installed: Vec<PathBuf>,
    pub tmpfiles: Option<String>,
    pub units: Vec<UnitName>,
}

struct Candidate {
    name: UnitName,
    path: PathBuf,
}

fn regular_files(dir: &Path) -> Result<Vec<PathBuf>, EnableError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(ref error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(EnableError::ListUnits { path: dir.to_owned(), error }),
    };
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|error| EnableError::ListUnits { path: dir.to_owned(), error })?;
        let path = entry.path();
        // Symlinks are aliases of other units.
        let is_file = std::fs::symlink_metadata(&path).map(|meta| meta.file_type().is_file()).unwrap_or(false);
        if is_file {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn candidate(path: PathBuf) -> Result<Candidate, EnableError> {
    let file_name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    let name = file_name.parse::<UnitName>()
        .map_err(|error| EnableError::InvalidUnitName { path: path.clone(), error })?;
    Ok(Candidate { name, path, })
}

fn should_enable(candidate: &Candidate) -> Result<bool, EnableError> {
    let info = InstallInfo::load(&candidate.path)?;
    if !info.is_installable() {
        log::debug!("{} has no install section, skipping", candidate.name);
        return Ok(false);
    }
    if candidate.name.is_template() && info.default_instance.is_none() {
        log::debug!("{} is a template without DefaultInstance, skipping", candidate.name);
        return Ok(false);
    }
    Ok(true)
}

fn install_pkgfiles(debhelper: &Debhelper, package: &BinaryPackage, options: &Options, report: &mut PackageReport) -> Result<(), EnableError> {
    let tmpdir = debhelper.tmpdir(&package.name);
    let name = options.name.as_deref().unwrap_or_else(|| package.name.as_str());

    for suffix in UNIT_SUFFIXES {
        if let Some(source) = debhelper.pkgfile(&package.name, options.name.as_deref(), suffix) {
            let dest = tmpdir.join(UNIT_DIRS[0]).join(format!("{}.{}", name, suffix));
            debhelper.install_file(&source, &dest)?;
            report.installed.push(dest);
        }
    }

    if let Some(source) = debhelper.pkgfile(&package.name, options.name.as_deref(), "tmpfile") {
        let conf = format!("{}.conf", name);
        let dest = tmpdir.join(TMPFILES_DIR).join(&conf);
        debhelper.install_file(&source, &dest)?;
        report.installed.push(dest);
        report.tmpfiles = Some(conf);
    }
    Ok(())
}

fn collect_units(debhelper: &Debhelper, package: &BinaryPackage, options: &Options) -> Result<Vec<Candidate>, EnableError> {
    let tmpdir = debhelper.tmpdir(&package.name);
    let mut paths = Vec::new();
    for dir in UNIT_DIRS {
        paths.extend(regular_files(&tmpdir.join(dir))?);
    }
    paths.extend(options.units.iter().map(|unit| tmpdir.join(unit)));

    let mut seen = Map::new();
    for path in paths {
        let candidate = candidate(path)?;
        // The first location of a unit wins, as in the systemd search path.
        seen.entry(candidate.name.clone()).or_insert(candidate);
    }
    Ok(seen.into_iter().map(|(_, candidate)| candidate).collect())
}

fn write_scripts(debhelper: &Debhelper, package: &BinaryPackage, options: &Options, report: &PackageReport) -> Result<(), EnableError> {
    let scripts = Autoscripts::new(debhelper.debian_dir(), TOOL_NAME, env!("CARGO_PKG_VERSION"))
        .no_act(debhelper.is_no_act());
    let snippet = if options.no_enable {
        autoscript::POSTINST_DONT_ENABLE
    } else {
        autoscript::POSTINST_ENABLE
    };

    for unit in &report.units {
        let mut vars = Map::new();
        vars.insert("unit_file", ShellQuoted(unit).to_string());
        scripts.add(&package.name, Script::Postinst, snippet, &vars)?;
    }

    if !report.units.is_empty() {
        let unit_files = report.units
            .iter()
            .map(|unit| ShellQuoted(unit).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let mut vars = Map::new();
        vars.insert("unit_files", unit_files);
        scripts.add(&package.name, Script::Postrm, autoscript::POSTRM, &vars)?;
    }

    if let Some(tmpfiles) = &report.tmpfiles {
        let mut vars = Map::new();
        vars.insert("tmpfiles", ShellQuoted(tmpfiles).to_string());
        scripts.add(&package.name, Script::Postinst, autoscript::POSTINST_TMPFILES, &vars)?;
    }
    Ok(())
}

/// Processes one binary package.
pub fn process_package(debhelper: &Debhelper, package: &BinaryPackage, options: &Options) -> Result<PackageReport, EnableError> {
    let mut report = PackageReport::default();
    install_pkgfiles(debhelper, package, options, &mut report)?;

    // Without acting, freshly installed units are not in the tmpdir yet.
    let mut candidates = collect_units(debhelper, package, options)?;
    if debhelper.is_no_act() {
        for path in &report.installed {
            if path.starts_with(debhelper.tmpdir(&package.name).join(UNIT_DIRS[0])) {
                let installed = candidate(path.clone())?;
                if !candidates.iter().any(|candidate| candidate.name == installed.name) {
                    candidates.push(installed);
                }
            }
        }
    }

    for candidate in candidates {
        if !candidate.path.exists() {
            // Units installed in no-act mode can't be inspected.
            if debhelper.is_no_act() && report.installed.contains(&candidate.path) {
                report.units.push(candidate.name);
                continue;
            }
            return Err(EnableError::MissingUnit { path: candidate.path });
        }
        if should_enable(&candidate)? {
            report.units.push(candidate.name);
        }
    }

    if !options.no_scripts {
        write_scripts(debhelper, package, options, &report)?;
    }
    if !report.units.is_empty() {
        autoscript::add_substvar(debhelper.debian_dir(), &package.name, SUBSTVAR_NAME, SUBSTVAR_VALUE, debhelper.is_no_act())?;
    }
    Ok(report)
}

/// Processes all selected packages.
pub fn run(debhelper: &Debhelper, options: &Options) -> Result<(), EnableError> {
    for package in debhelper.packages(&options.selection)? {
        let report = process_package(debhelper, package, options)?;
        if report.units.is_empty() {
            log::debug!("no units to enable in {}", package.name);
        } else {
            log::info!("{}: {}", package.name, report.units.iter().map(UnitName::as_str).collect::<Vec<_>>().join(" "));
        }
    }
    Ok(())
}
