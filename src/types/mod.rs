pub use package_name::{PackageName, PackageNameError};
pub use unit_name::{UnitName, UnitNameError};

mod package_name;
mod unit_name;
