//! `evergreen-build generate` command

use anyhow::Result;

use super::Context;
use evergreen_build::ops::generate;
use evergreen_build::pipeline::StageReporter;
use evergreen_build::util::{EnvResolver, ShellExecutor};

pub fn execute(ctx: &Context) -> Result<()> {
    let env = EnvResolver::host();
    let mut executor = ShellExecutor::new();
    let mut reporter = StageReporter::stdout();

    generate(&ctx.layout, &ctx.config, &env, &mut executor, &mut reporter)?;
    Ok(())
}
