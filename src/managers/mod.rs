pub mod apt;
pub mod npm;
pub mod pipx;
pub mod snap;

pub use apt::AptManager;
pub use npm::NpmManager;
pub use pipx::PipxManager;
pub use snap::SnapManager;

use crate::error::Result;
use crate::executor::CommandRunner;

pub const APT_GET_EXE: &str = "/usr/bin/apt-get";
pub const SNAP_EXE: &str = "/usr/bin/snap";
pub const NPM_EXE: &str = "/usr/bin/npm";
pub const PIPX_EXE: &str = "/usr/bin/pipx";

/// A package manager that knows how to upgrade everything it installed.
pub trait PackageManager {
    /// Display name, logged before the upgrade starts.
    fn name(&self) -> &str;

    /// Upgrade all packages. An `Err` aborts the whole run.
    fn upgrade(&self, runner: &dyn CommandRunner) -> Result<()>;

    /// Best-effort check once every manager has upgraded. Never fails.
    fn post_upgrade(&self) {}
}

/// The managers to upgrade, in the order they run.
pub fn registry() -> Vec<Box<dyn PackageManager>> {
    vec![
        Box::new(AptManager::default()),
        Box::new(SnapManager),
        Box::new(NpmManager),
        Box::new(PipxManager),
    ]
}
