use std::convert::TryFrom;
use std::fmt;
use std::path::{Path, PathBuf};
use serde_derive::Deserialize;

/// Name of a binary package as written in `debian/control`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct PackageName(String);

impl PackageName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Staging directory of the package, `debian/<package>`.
    pub fn tmpdir(&self, debian_dir: &Path) -> PathBuf {
        debian_dir.join(&self.0)
    }

    /// `debian/<package>.<suffix>`. Package names may contain dots.
    pub fn debian_file(&self, debian_dir: &Path, suffix: &str) -> PathBuf {
        debian_dir.join(format!("{}.{}", self.0, suffix))
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PackageNameError {
    #[error("Package name {string} is too short")]
    TooShort { string: String },
    #[error("Package name {string} must start with an alphanumeric character")]
    BadStart { string: String },
    #[error("Invalid character {c} in package name {string}")]
    InvalidChar { c: char, string: String },
}

impl TryFrom<String> for PackageName {
    type Error = PackageNameError;

    fn try_from(string: String) -> Result<Self, Self::Error> {
        if string.len() < 2 {
            return Err(PackageNameError::TooShort { string });
        }
        if !string.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()) {
            return Err(PackageNameError::BadStart { string });
        }
        for c in string.chars() {
            if c != '-' && c != '+' && c != '.' && (c < 'a' || c > 'z') && (c < '0' || c > '9') {
                return Err(PackageNameError::InvalidChar { c, string });
            }
        }
        Ok(PackageName(string))
    }
}

impl std::str::FromStr for PackageName {
    type Err = PackageNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageName::try_from(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::PackageName;
    use std::path::Path;

    macro_rules! valid {
        ($name:ident, $input:expr) => {
            #[test]
            fn $name() {
                let name: PackageName = $input.parse().unwrap();
                assert_eq!(name.as_str(), $input);
            }
        }
    }

    macro_rules! invalid {
        ($name:ident, $input:expr) => {
            #[test]
            fn $name() {
                assert!($input.parse::<PackageName>().is_err());
            }
        }
    }

    valid!(simple, "foo");
    valid!(with_dash, "foo-bar");
    valid!(with_version_chars, "libfoo2.0+dfsg");
    valid!(leading_digit, "0ad");

    invalid!(empty, "");
    invalid!(single_char, "a");
    invalid!(uppercase, "Foo");
    invalid!(leading_dash, "-foo");
    invalid!(underscore, "foo_bar");

    #[test]
    fn debian_file_keeps_dots() {
        let name: PackageName = "libfoo2.0".parse().unwrap();
        assert_eq!(name.debian_file(Path::new("debian"), "service"), Path::new("debian/libfoo2.0.service"));
        assert_eq!(name.tmpdir(Path::new("debian")), Path::new("debian/libfoo2.0"));
    }
}
