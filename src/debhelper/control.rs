use std::fmt;
use std::path::{Path, PathBuf};
use serde_derive::Deserialize;
use crate::types::PackageName;

#[derive(Deserialize)]
#[derive(Clone, Eq, PartialEq, Debug)]
#[serde(from = "String")]
pub enum Architecture {
    All,
    Dependent(String),
}

impl From<String> for Architecture {
    fn from(value: String) -> Self {
        if value.trim() == "all" {
            Architecture::All
        } else {
            Architecture::Dependent(value.trim().to_owned())
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Architecture::All => write!(f, "all"),
            Architecture::Dependent(arch) => write!(f, "{}", arch),
        }
    }
}

#[derive(Deserialize)]
struct Paragraph {
    #[serde(rename = "Source")]
    source: Option<String>,
    #[serde(rename = "Package")]
    package: Option<PackageName>,
    #[serde(rename = "Architecture")]
    architecture: Option<Architecture>,
}

#[derive(Debug, Clone)]
pub struct BinaryPackage {
    pub name: PackageName,
    pub architecture: Architecture,
}

impl BinaryPackage {
    pub fn is_arch_indep(&self) -> bool {
        self.architecture == Architecture::All
    }
}

/// The parts of `debian/control` the helpers act on.
///
/// Always holds at least one binary package.
#[derive(Debug, Clone)]
pub struct Control {
    source: String,
    packages: Vec<BinaryPackage>,
}

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("failed to read {path}")]
    Read { path: PathBuf, #[source] error: std::io::Error },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("{path} doesn't start with a source paragraph")]
    MissingSource { path: PathBuf },
    #[error("package {package} in {path} has no Architecture field")]
    MissingArchitecture { path: PathBuf, package: PackageName },
    #[error("{path} doesn't declare any binary packages")]
    NoPackages { path: PathBuf },
}

// The deserializer doesn't know about comments or blank lines with whitespace.
fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_paragraph = false;
    for line in input.lines() {
        if line.starts_with('#') {
            continue;
        }
        if line.trim().is_empty() {
            if in_paragraph {
                out.push('\n');
                in_paragraph = false;
            }
            continue;
        }
        out.push_str(line);
        out.push('\n');
        in_paragraph = true;
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

impl Control {
    pub fn parse(input: &str, path: &Path) -> Result<Self, ControlError> {
        let paragraphs = rfc822_like::from_str::<Vec<Paragraph>>(&strip_comments(input))
            .map_err(|error| ControlError::Parse { path: path.to_owned(), message: error.to_string() })?;
        let mut paragraphs = paragraphs.into_iter();
        let source = paragraphs
            .next()
            .and_then(|paragraph| paragraph.source)
            .ok_or_else(|| ControlError::MissingSource { path: path.to_owned() })?;

        let mut packages = Vec::new();
        for paragraph in paragraphs {
            let name = match paragraph.package {
                Some(name) => name,
                None => continue,
            };
            let architecture = paragraph.architecture
                .ok_or_else(|| ControlError::MissingArchitecture { path: path.to_owned(), package: name.clone() })?;
            packages.push(BinaryPackage { name, architecture, });
        }
        if packages.is_empty() {
            return Err(ControlError::NoPackages { path: path.to_owned() });
        }
        Ok(Control { source, packages, })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ControlError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|error| ControlError::Read { path: path.to_owned(), error })?;
        Self::parse(&input, path)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn packages(&self) -> &[BinaryPackage] {
        &self.packages
    }

    /// The first binary package, which owns the bare `debian/<suffix>` files.
    pub fn main_package(&self) -> Option<&BinaryPackage> {
        self.packages.first()
    }
}
