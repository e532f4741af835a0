//! `m64prs-stage clean` command

use anyhow::Result;

use super::Session;
use crate::cli::CleanArgs;
use m64prs_stage::core::Profile;
use m64prs_stage::ops::stage_clean::clean;

pub fn execute(args: CleanArgs, session: &Session) -> Result<()> {
    let ctx = session.context()?;
    let profile = Profile::select(args.release, ctx.env().profile.as_deref());

    let result = clean(&ctx, &session.runner(), profile)?;
    if result.removed.is_empty() {
        ctx.shell().note(format!("nothing to clean for {}", profile));
    }
    Ok(())
}
