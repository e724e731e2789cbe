//! Enabling, disabling and masking of systemd units on behalf of Debian
//! packages, and the debhelper tool generating the maintainer script calls.
//!
//! `deb-systemd-helper` runs inside maintainer scripts and remembers which
//! links it created, so that units disabled by the administrator stay
//! disabled across upgrades. `dh_systemd_enable` runs at build time.

pub mod types;
pub mod unit;
pub mod layout;
pub mod closure;
pub mod state;
pub mod helper;
pub mod template;
pub mod codegen;
pub mod autoscript;
pub mod debhelper;
pub mod systemd_enable;
pub mod logging;

pub type Map<K, V> = std::collections::BTreeMap<K, V>;
pub type Set<T> = std::collections::BTreeSet<T>;
