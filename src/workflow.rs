use crate::error::Result;
use crate::executor::CommandRunner;
use crate::managers::PackageManager;
use std::fmt;
use std::process::ExitCode;
use tracing::{error, info};

/// How a run ended, when it was not aborted by a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// Every manager upgraded and all post-upgrade checks ran.
    Completed,
    /// `manager` failed; later managers and all post-upgrade checks were skipped.
    Failed { manager: String },
}

impl UpgradeOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            UpgradeOutcome::Completed => 0,
            UpgradeOutcome::Failed { .. } => 1,
        }
    }
}

impl fmt::Display for UpgradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeOutcome::Completed => write!(f, "all package managers upgraded"),
            UpgradeOutcome::Failed { manager } => write!(f, "stopped after {manager} failed"),
        }
    }
}

impl From<UpgradeOutcome> for ExitCode {
    fn from(outcome: UpgradeOutcome) -> Self {
        ExitCode::from(outcome.exit_code())
    }
}

/// Upgrade every manager in order, then run their post-upgrade checks.
///
/// The first failing upgrade stops the run. Ordinary failures are logged and
/// reported as [`UpgradeOutcome::Failed`]; fatal errors are returned as-is.
pub fn execute_upgrade(
    managers: &[Box<dyn PackageManager>],
    runner: &dyn CommandRunner,
) -> Result<UpgradeOutcome> {
    for pm in managers {
        info!("{}", pm.name());

        if let Err(e) = pm.upgrade(runner) {
            if e.is_fatal() {
                return Err(e);
            }

            error!("{} upgrade failed: {}", pm.name(), e);
            return Ok(UpgradeOutcome::Failed {
                manager: pm.name().to_string(),
            });
        }
    }

    for pm in managers {
        pm.post_upgrade();
    }

    Ok(UpgradeOutcome::Completed)
}
