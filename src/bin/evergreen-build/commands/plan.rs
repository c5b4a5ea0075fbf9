//! `evergreen-build plan` command

use std::path::PathBuf;

use anyhow::Result;

use super::Context;
use crate::cli::{PipelineKind, PlanArgs};
use evergreen_build::ops::{format_plan, generate_pipeline, plan, setup_pipeline, PipelinePlan};
use evergreen_build::project::shipped_dependencies;
use evergreen_build::util::diagnostic::{emit, suggestions, Diagnostic};
use evergreen_build::util::EnvResolver;

pub fn execute(ctx: &Context, args: PlanArgs) -> Result<()> {
    let mut plans: Vec<PipelinePlan> = Vec::new();

    if matches!(args.pipeline, PipelineKind::Setup | PipelineKind::All) {
        let pipeline = setup_pipeline(&ctx.layout, &shipped_dependencies());
        plans.push(plan(&pipeline, &[]));
    }

    if matches!(args.pipeline, PipelineKind::Generate | PipelineKind::All) {
        let variable = ctx.config.sdk_variable();
        // Planning never needs the SDK to exist; show a placeholder instead.
        let include = EnvResolver::host()
            .sdk_include_dir(variable)
            .unwrap_or_else(|e| {
                let placeholder = PathBuf::from(format!("<{}>", variable)).join("Include");
                let warning = Diagnostic::warning(e.to_string())
                    .with_context(format!("planning with {}", placeholder.display()))
                    .with_suggestion(suggestions::SDK_MISSING);
                emit(&warning, ctx.color);
                placeholder
            });

        let pipeline = generate_pipeline(&ctx.layout, &ctx.config, &include)?;
        plans.push(plan(&pipeline, &[ctx.config.generator_tool()]));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
    } else {
        for plan in &plans {
            print!("{}", format_plan(plan));
        }
    }

    Ok(())
}
