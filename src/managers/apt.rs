use crate::error::Result;
use crate::executor::{CommandRunner, Invocation};
use crate::managers::{APT_GET_EXE, PackageManager};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Written by Debian/Ubuntu packages whose update needs a restart.
pub const REBOOT_REQUIRED_FILE: &str = "/run/reboot-required";

/// APT (Debian/Ubuntu)
pub struct AptManager {
    reboot_marker: PathBuf,
}

impl AptManager {
    pub fn new<P: AsRef<Path>>(reboot_marker: P) -> Self {
        Self {
            reboot_marker: reboot_marker.as_ref().to_path_buf(),
        }
    }

    pub fn reboot_required(&self) -> bool {
        self.reboot_marker.is_file()
    }
}

impl Default for AptManager {
    fn default() -> Self {
        Self::new(REBOOT_REQUIRED_FILE)
    }
}

impl PackageManager for AptManager {
    fn name(&self) -> &str {
        "APT"
    }

    fn upgrade(&self, runner: &dyn CommandRunner) -> Result<()> {
        runner.run(
            &Invocation::new(APT_GET_EXE)
                .args(["upgrade", "--update", "--assume-yes", "--verbose-versions"])
                .elevated(),
        )?;
        Ok(())
    }

    fn post_upgrade(&self) {
        if self.reboot_required() {
            warn!("A reboot is required.");
        }
    }
}
