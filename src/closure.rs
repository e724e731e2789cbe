use std::path::{Component, Path, PathBuf};
use crate::Set;
use crate::layout::{Layout, UnitFile};
use crate::types::UnitName;
use crate::unit::{InstallInfo, LoadUnitError};

/// A symlink the helper manages. Both paths are logical.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Link {
    pub target: PathBuf,
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ClosureError {
    #[error("unable to find unit file for {0}")]
    NotFound(UnitName),
    #[error(transparent)]
    Load(#[from] LoadUnitError),
}

// Link names must stay inside the link dir.
fn is_relative_name(value: &str) -> bool {
    let path = Path::new(value);
    !value.is_empty() && path.components().all(|component| match component {
        Component::Normal(_) => true,
        _ => false,
    })
}

struct Walk<'a> {
    layout: &'a Layout,
    visited: Set<UnitName>,
    seen: Set<PathBuf>,
    links: Vec<Link>,
}

impl<'a> Walk<'a> {
    fn push(&mut self, target: &UnitFile, relative: String) {
        let path = self.layout.link_path(relative);
        if self.seen.insert(path.clone()) {
            self.links.push(Link {
                target: target.path.clone(),
                path,
            });
        }
    }

    fn visit(&mut self, unit: &UnitName, file: &UnitFile) -> Result<(), ClosureError> {
        self.visited.insert(unit.clone());
        log::debug!("Reading {} for {}", file.rooted.display(), unit);
        let info = InstallInfo::load(&file.rooted)?;

        let link_name = if unit.is_template() {
            info.default_instance.as_ref().and_then(|instance| unit.instantiate(instance))
        } else {
            Some(unit.clone())
        };

        let dependencies = info.wanted_by.iter().map(|target| (target, "wants"))
            .chain(info.required_by.iter().map(|target| (target, "requires")));
        for (target, kind) in dependencies {
            if !is_relative_name(target) {
                log::warn!("Ignoring invalid target {} in {}", target, unit);
                continue;
            }
            match &link_name {
                Some(link_name) => self.push(file, format!("{}.{}/{}", target, kind, link_name)),
                None => log::warn!("{} is a template without DefaultInstance, not adding it to {}", unit, target),
            }
        }

        for alias in &info.alias {
            if alias == unit.as_str() {
                continue;
            }
            if !is_relative_name(alias) {
                log::warn!("Ignoring invalid Alias={} in {}", alias, unit);
                continue;
            }
            self.push(file, alias.clone());
        }

        for also in &info.also {
            let also = match also.parse::<UnitName>() {
                Ok(name) => name,
                Err(error) => {
                    log::warn!("Ignoring Also={} in {}: {}", also, unit, error);
                    continue;
                },
            };
            if self.visited.contains(&also) {
                continue;
            }
            match self.layout.find_unit(&also) {
                Some(also_file) => self.visit(&also, &also_file)?,
                None => log::warn!("Unit {} referenced by Also= in {} not found", also, unit),
            }
        }

        Ok(())
    }
}

/// Resolves all links that enabling `unit` creates, following `Also=` recursively.
///
/// Links are returned in first-seen order without duplicates.
pub fn resolve(layout: &Layout, unit: &UnitName) -> Result<Vec<Link>, ClosureError> {
    let file = layout.find_unit(unit).ok_or_else(|| ClosureError::NotFound(unit.clone()))?;
    let mut walk = Walk {
        layout,
        visited: Set::new(),
        seen: Set::new(),
        links: Vec::new(),
    };
    walk.visit(unit, &file)?;
    Ok(walk.links)
}
