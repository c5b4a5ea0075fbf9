//! `evergreen-build setup` command

use anyhow::Result;

use super::Context;
use evergreen_build::ops::setup;
use evergreen_build::pipeline::StageReporter;
use evergreen_build::util::ShellExecutor;

pub fn execute(ctx: &Context) -> Result<()> {
    let mut executor = ShellExecutor::new();
    let mut reporter = StageReporter::stdout();

    setup(&ctx.layout, &mut executor, &mut reporter)?;
    Ok(())
}
