use crate::error::Result;
use crate::executor::{CommandRunner, Invocation};
use crate::managers::{PackageManager, SNAP_EXE};

pub struct SnapManager;

impl PackageManager for SnapManager {
    fn name(&self) -> &str {
        "Snap"
    }

    fn upgrade(&self, runner: &dyn CommandRunner) -> Result<()> {
        runner.run(&Invocation::new(SNAP_EXE).arg("refresh").elevated())?;
        Ok(())
    }
}
