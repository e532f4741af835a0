//! MSVC discovery and developer-shell capture.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{parse_env_output, TargetArch, ToolchainEnvironment};
use crate::util::config::BuildEnv;
use crate::util::errors::StageError;
use crate::util::process::{ProcessBuilder, ProcessRunner};

const DEFAULT_PROGRAM_FILES_X86: &str = r"C:\Program Files (x86)";

/// A located Visual Studio installation with its captured environment.
#[derive(Debug, Clone)]
pub struct MsvcToolchain {
    pub install_path: PathBuf,
    pub msbuild: PathBuf,
    pub arch: TargetArch,
    pub env: ToolchainEnvironment,
}

/// Where the Visual Studio installer puts `vswhere.exe`.
pub fn vswhere_path(program_files_x86: Option<&Path>) -> PathBuf {
    program_files_x86
        .unwrap_or_else(|| Path::new(DEFAULT_PROGRAM_FILES_X86))
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe")
}

/// `VsDevCmd.bat` inside an installation.
pub fn dev_cmd_path(install_path: &Path) -> PathBuf {
    install_path.join("Common7").join("Tools").join("VsDevCmd.bat")
}

/// Run vswhere and return the first non-empty line of its output.
fn vswhere(runner: &dyn ProcessRunner, vswhere: &Path, args: &[&str]) -> Result<String> {
    let cmd = ProcessBuilder::new(vswhere).args(args);
    let query = args.join(" ");
    let output = runner.output(&cmd)?;

    if !output.success() {
        return Err(StageError::ToolchainDiscoveryFailure {
            query,
            detail: output.stderr,
        }
        .into());
    }

    match output.stdout.lines().map(str::trim).find(|l| !l.is_empty()) {
        Some(line) => Ok(line.to_string()),
        None => Err(StageError::ToolchainDiscoveryFailure {
            query,
            detail: "vswhere returned no result".to_string(),
        }
        .into()),
    }
}

/// Locate Visual Studio and MSBuild, then capture the developer shell's
/// environment for `arch`.
pub fn bootstrap(
    runner: &dyn ProcessRunner,
    env: &BuildEnv,
    arch: TargetArch,
) -> Result<MsvcToolchain> {
    let vswhere_exe = vswhere_path(env.program_files_x86.as_deref());
    if !vswhere_exe.is_file() {
        return Err(StageError::ToolchainNotFound { path: vswhere_exe }.into());
    }
    tracing::debug!("Found vswhere at: {}", vswhere_exe.display());

    let install_path = PathBuf::from(vswhere(
        runner,
        &vswhere_exe,
        &["-latest", "-property", "installationPath"],
    )?);
    let msbuild = PathBuf::from(vswhere(
        runner,
        &vswhere_exe,
        &[
            "-latest",
            "-requires",
            "Microsoft.Component.MSBuild",
            "-find",
            r"MSBuild\**\Bin\MSBuild.exe",
        ],
    )?);
    tracing::debug!("Found Visual Studio at: {}", install_path.display());
    tracing::debug!("Found MSBuild at: {}", msbuild.display());

    let dev_cmd = dev_cmd_path(&install_path);
    let shell = ProcessBuilder::new("cmd.exe").args(["/s", "/c"]).raw_arg(format!(
        r#"""{}" -no_logo -arch={} && set""#,
        dev_cmd.display(),
        arch.dev_env_tag()
    ));
    let output = runner.output(&shell)?;
    if !output.success() {
        return Err(StageError::ToolchainDiscoveryFailure {
            query: format!("{} -arch={}", dev_cmd.display(), arch.dev_env_tag()),
            detail: output.stderr,
        }
        .into());
    }

    let env = parse_env_output(&output.stdout)?;
    tracing::info!("captured {} variables from the {} developer shell", env.len(), arch);

    Ok(MsvcToolchain {
        install_path,
        msbuild,
        arch,
        env,
    })
}
