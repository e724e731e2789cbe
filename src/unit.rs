//! Line-oriented scanning of the install directives of a unit file.
//!
//! Sections, quoting and line continuations are ignored, only `Key=value`
//! lines of interest are picked up.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Directive {
    WantedBy,
    RequiredBy,
    Also,
    Alias,
    DefaultInstance,
}

impl Directive {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "WantedBy" => Some(Directive::WantedBy),
            "RequiredBy" => Some(Directive::RequiredBy),
            "Also" => Some(Directive::Also),
            "Alias" => Some(Directive::Alias),
            "DefaultInstance" => Some(Directive::DefaultInstance),
            _ => None,
        }
    }
}

/// Install directives found in a unit file.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct InstallInfo {
    pub wanted_by: Vec<String>,
    pub required_by: Vec<String>,
    pub also: Vec<String>,
    pub alias: Vec<String>,
    pub default_instance: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("unable to read unit file {path}")]
pub struct LoadUnitError {
    path: PathBuf,
    #[source]
    error: std::io::Error,
}

fn split_directive(line: &str) -> Option<(Directive, &str)> {
    let line = line.trim_start();
    let pos = line.find('=')?;
    let directive = Directive::from_key(line[..pos].trim_end())?;
    Some((directive, line[(pos + 1)..].trim()))
}

fn assign(list: &mut Vec<String>, value: &str) {
    // An empty assignment resets the list.
    if value.is_empty() {
        list.clear();
    } else {
        list.extend(value.split_whitespace().map(String::from));
    }
}

impl InstallInfo {
    pub fn parse(text: &str) -> Self {
        let mut info = InstallInfo::default();
        for line in text.lines() {
            let (directive, value) = match split_directive(line) {
                Some(found) => found,
                None => continue,
            };
            match directive {
                Directive::WantedBy => assign(&mut info.wanted_by, value),
                Directive::RequiredBy => assign(&mut info.required_by, value),
                Directive::Also => assign(&mut info.also, value),
                Directive::Alias => assign(&mut info.alias, value),
                Directive::DefaultInstance if value.is_empty() => info.default_instance = None,
                Directive::DefaultInstance => info.default_instance = Some(value.to_owned()),
            }
        }
        info
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadUnitError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|error| LoadUnitError {
            path: path.to_owned(),
            error,
        })?;
        Ok(InstallInfo::parse(&text))
    }

    /// Whether enabling the unit would do anything at all.
    pub fn is_installable(&self) -> bool {
        !(self.wanted_by.is_empty() && self.required_by.is_empty() && self.also.is_empty() && self.alias.is_empty())
    }
}
