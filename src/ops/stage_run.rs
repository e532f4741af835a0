//! Implementation of `m64prs-stage run`.

use std::ffi::OsString;

use anyhow::Result;

use crate::core::bundle::FRONTEND;
use crate::ops::stage_build::{build, BuildOptions};
use crate::util::context::GlobalContext;
use crate::util::errors::StageError;
use crate::util::process::{ProcessBuilder, ProcessRunner};
use crate::util::shell::Status;

/// Build and stage, then launch the staged front end with `args`.
///
/// The child inherits stdio and runs with the install tree's `bin`
/// directory as its working directory.
pub fn run(
    ctx: &GlobalContext,
    runner: &dyn ProcessRunner,
    opts: &BuildOptions,
    args: &[OsString],
) -> Result<()> {
    let result = build(ctx, runner, opts)?;

    let bin = &result.install_dirs.bin;
    let exe = bin.join(FRONTEND.staged_file(ctx.host()));
    if !exe.is_file() {
        return Err(StageError::MissingSource { path: exe }.into());
    }

    let cmd = ProcessBuilder::new(&exe).args(args).cwd(bin);
    ctx.shell().status(Status::Running, cmd.display_command());

    let output = runner.status(&cmd)?;
    if !output.success() {
        return Err(StageError::ProcessFailed {
            program: FRONTEND.staged_name.to_string(),
            code: output.code,
        }
        .into());
    }
    Ok(())
}
