//! `m64prs-stage run` command

use anyhow::Result;

use super::Session;
use crate::cli::RunArgs;
use m64prs_stage::ops::stage_build::BuildOptions;
use m64prs_stage::ops::stage_run::run;

pub fn execute(args: RunArgs, session: &Session) -> Result<()> {
    let ctx = session.context()?;
    let opts = BuildOptions::resolve(
        args.build.release,
        args.build.install_scheme,
        args.build.jobs,
        &ctx,
    )?;

    run(&ctx, &session.runner(), &opts, &args.args)
}
