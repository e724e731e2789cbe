use std::convert::TryFrom;
use std::fmt;
use serde_derive::Deserialize;

const DEFAULT_SUFFIX: &str = "service";

/// File name of a unit, e.g. `foo.service`, `foo@.service` or `foo@bar.socket`.
///
/// Names given without a type suffix are treated as services.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct UnitName(String);

impl UnitName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn dot(&self) -> usize {
        // validated on construction
        self.0.rfind('.').unwrap_or(self.0.len())
    }

    fn stem(&self) -> &str {
        &self.0[..self.dot()]
    }

    /// Unit type, the part after the last dot.
    pub fn suffix(&self) -> &str {
        &self.0[(self.dot() + 1)..]
    }

    /// Name without the instance and the type suffix.
    pub fn prefix(&self) -> &str {
        let stem = self.stem();
        stem.find('@').map(|pos| &stem[..pos]).unwrap_or(stem)
    }

    pub fn is_template(&self) -> bool {
        self.stem().ends_with('@')
    }

    /// The instance part of `foo@bar.service`, `None` for plain units and templates.
    pub fn instance(&self) -> Option<&str> {
        let stem = self.stem();
        let pos = stem.find('@')?;
        let instance = &stem[(pos + 1)..];
        if instance.is_empty() {
            None
        } else {
            Some(instance)
        }
    }

    /// The template an instance was created from.
    pub fn template(&self) -> Option<UnitName> {
        self.instance()?;
        Some(UnitName(format!("{}@.{}", self.prefix(), self.suffix())))
    }

    pub fn instantiate(&self, instance: &str) -> Option<UnitName> {
        if !self.is_template() || instance.is_empty() {
            return None;
        }
        UnitName::try_from(format!("{}@{}.{}", self.prefix(), instance, self.suffix())).ok()
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for UnitName {
    fn as_ref(&self) -> &std::path::Path {
        self.0.as_ref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UnitNameError {
    #[error("Empty unit name")]
    Empty,
    #[error("Invalid character {c:?} in unit name {string}")]
    InvalidChar { c: char, string: String },
    #[error("Unit name {string} has an empty prefix")]
    EmptyPrefix { string: String },
    #[error("Unit name {string} has an empty type suffix")]
    EmptySuffix { string: String },
    #[error("Unit name {string} contains more than one @")]
    MultipleAt { string: String },
}

impl TryFrom<String> for UnitName {
    type Error = UnitNameError;

    fn try_from(mut string: String) -> Result<Self, Self::Error> {
        if string.is_empty() {
            return Err(UnitNameError::Empty);
        }
        for c in string.chars() {
            if c == '/' || c == '\0' || c.is_whitespace() {
                return Err(UnitNameError::InvalidChar { c, string });
            }
        }
        if string.matches('@').count() > 1 {
            return Err(UnitNameError::MultipleAt { string });
        }
        match string.rfind('.') {
            None => {
                string.push('.');
                string.push_str(DEFAULT_SUFFIX);
            },
            Some(pos) if pos + 1 == string.len() => return Err(UnitNameError::EmptySuffix { string }),
            Some(_) => (),
        }
        let name = UnitName(string);
        if name.prefix().is_empty() {
            return Err(UnitNameError::EmptyPrefix { string: name.0 });
        }
        Ok(name)
    }
}

impl std::str::FromStr for UnitName {
    type Err = UnitNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitName::try_from(s.to_owned())
    }
}
