use crate::error::{Result, UpperError};
use crate::executor::{CommandRunner, Invocation};
use crate::managers::{NPM_EXE, PackageManager};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

/// Globally installed npm packages.
///
/// npm has no "upgrade everything" command, so the outdated list is queried
/// as JSON and every entry is installed again at its latest version.
pub struct NpmManager;

/// One entry of `npm outdated --json`. Other fields npm reports are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutdatedPackage {
    pub current: String,
    pub latest: String,
}

impl NpmManager {
    fn outdated_query() -> Invocation {
        // npm exits with 1 when anything is outdated.
        Invocation::new(NPM_EXE)
            .args(["outdated", "--global", "--json"])
            .capture_stdout()
            .accept_exit_code(1)
    }

    fn install(package: &str, version: &str) -> Invocation {
        Invocation::new(NPM_EXE)
            .args(["install", "--global", "--no-audit", "--no-fund", "--silent"])
            .arg(format!("{package}@{version}"))
            .elevated()
    }

    /// Parses `npm outdated --json` output, keeping the document order.
    pub fn parse_outdated(stdout: &str) -> Result<Vec<(String, OutdatedPackage)>> {
        let unexpected = |reason: String| UpperError::UnexpectedOutput {
            command: Self::outdated_query().display(),
            reason,
        };

        let entries = match serde_json::from_str::<Value>(stdout)? {
            Value::Object(entries) => entries,
            other => {
                return Err(unexpected(format!("expected a JSON object, got `{other}`")));
            }
        };

        entries
            .into_iter()
            .map(|(name, versions)| -> Result<(String, OutdatedPackage)> {
                let versions = serde_json::from_value::<OutdatedPackage>(versions)
                    .map_err(|e| unexpected(format!("entry `{name}`: {e}")))?;
                Ok((name, versions))
            })
            .collect()
    }
}

impl PackageManager for NpmManager {
    fn name(&self) -> &str {
        "npm"
    }

    fn upgrade(&self, runner: &dyn CommandRunner) -> Result<()> {
        let query = Self::outdated_query();
        let stdout = runner
            .run(&query)?
            .filter(|out| !out.trim().is_empty())
            .ok_or_else(|| UpperError::MissingOutput {
                command: query.display(),
            })?;

        let outdated = Self::parse_outdated(&stdout)?;
        if outdated.is_empty() {
            info!("All packages are up-to-date.");
            return Ok(());
        }

        for (package, versions) in &outdated {
            info!(
                "Upgrading {}: {} -> {}",
                package, versions.current, versions.latest
            );
            runner.run(&Self::install(package, &versions.latest))?;
        }

        Ok(())
    }
}
