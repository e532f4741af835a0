//! `m64prs-stage build` command

use anyhow::Result;

use super::Session;
use crate::cli::BuildArgs;
use m64prs_stage::ops::stage_build::{build, BuildOptions};

pub fn execute(args: BuildArgs, session: &Session) -> Result<()> {
    let ctx = session.context()?;
    let opts = BuildOptions::resolve(args.release, args.install_scheme, args.jobs, &ctx)?;

    let result = build(&ctx, &session.runner(), &opts)?;

    ctx.shell().note(format!(
        "{} tree ready at {}",
        result.profile,
        ctx.install_dir(result.profile).display()
    ));
    Ok(())
}
