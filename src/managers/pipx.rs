use crate::error::Result;
use crate::executor::{CommandRunner, Invocation};
use crate::managers::{PIPX_EXE, PackageManager};

pub struct PipxManager;

impl PackageManager for PipxManager {
    fn name(&self) -> &str {
        "pipx"
    }

    fn upgrade(&self, runner: &dyn CommandRunner) -> Result<()> {
        // Plain-text progress lines from pipx.
        runner.run(
            &Invocation::new(PIPX_EXE)
                .arg("upgrade-all")
                .env("USE_EMOJI", "0"),
        )?;
        Ok(())
    }
}
