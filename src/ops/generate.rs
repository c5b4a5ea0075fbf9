//! Implementation of `evergreen-build generate`.
//!
//! Installs the binding generator, then for every module: builds its native
//! library (once per library), generates the bindings and builds them in
//! Debug and Release.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use crate::codegen::{check_module_order, CodegenInvocation, ModuleCodegenSpec};
use crate::ops::plan::warn_missing_programs;
use crate::pipeline::{Pipeline, PipelineReport, Stage, StageReporter};
use crate::project::{native_libraries, shipped_modules, NativeLibrary, ProjectLayout};
use crate::util::config::Config;
use crate::util::diagnostic::PipelineError;
use crate::util::env::EnvResolver;
use crate::util::process::{CommandLine, Executor};

/// Build the `generate` pipeline for the shipped modules.
pub fn generate_pipeline(
    layout: &ProjectLayout,
    config: &Config,
    vulkan_include: &Path,
) -> Result<Pipeline, PipelineError> {
    let modules = shipped_modules(vulkan_include);
    build_pipeline(layout, config, &native_libraries(), &modules)
}

/// Build a `generate` pipeline for arbitrary libraries and modules.
pub fn build_pipeline(
    layout: &ProjectLayout,
    config: &Config,
    libraries: &[NativeLibrary],
    modules: &[ModuleCodegenSpec],
) -> Result<Pipeline, PipelineError> {
    check_module_order(modules)?;

    let mut pipeline = Pipeline::new("generate")
        .in_dir(layout.root())
        .stage(install_stage(config));

    let mut built: HashSet<&str> = HashSet::new();
    for module in modules {
        let library = libraries
            .iter()
            .find(|l| l.binary == module.library)
            .ok_or_else(|| {
                PipelineError::malformed(
                    &module.title,
                    format!("no native library produces `{}`", module.library),
                )
            })?;

        if built.insert(library.binary.as_str()) {
            pipeline = pipeline.stage(native_stage(layout, library));
        }

        pipeline = pipeline.stage(bindings_stage(layout, config, module)?);
    }

    Ok(pipeline)
}

fn install_stage(config: &Config) -> Stage {
    Stage::new("Binding generator").run(
        CommandLine::new("dotnet")
            .args(["tool", "install", "--global"])
            .arg(config.generator_tool())
            .arg("--version")
            .arg(config.generator_version()),
    )
}

fn native_stage(layout: &ProjectLayout, library: &NativeLibrary) -> Stage {
    let solution = layout.path(&library.solution);
    Stage::new(format!("{} native", library.title))
        .run(CommandLine::new("msbuild").path_arg(&solution))
        .run(
            CommandLine::new("msbuild")
                .arg("/p:Configuration=Release")
                .path_arg(&solution),
        )
}

fn bindings_stage(
    layout: &ProjectLayout,
    config: &Config,
    module: &ModuleCodegenSpec,
) -> Result<Stage, PipelineError> {
    let codegen = CodegenInvocation::new(module)
        .generator(config.generator_tool())
        .root(layout.root())
        .build()?;
    let project = layout.path(&module.project);

    Ok(Stage::new(format!("{} bindings", module.title))
        .run(codegen)
        .run(CommandLine::new("dotnet").arg("build").path_arg(&project))
        .run(
            CommandLine::new("dotnet")
                .args(["build", "-c", "Release"])
                .path_arg(&project),
        ))
}

/// Resolve the SDK, build the pipeline and run it.
///
/// Configuration and module data are checked before the first command runs.
pub fn generate<W: Write>(
    layout: &ProjectLayout,
    config: &Config,
    env: &EnvResolver,
    executor: &mut dyn Executor,
    reporter: &mut StageReporter<W>,
) -> Result<PipelineReport, PipelineError> {
    let vulkan_include = env.sdk_include_dir(config.sdk_variable())?;
    tracing::debug!("Vulkan include directory: {}", vulkan_include.display());

    let pipeline = generate_pipeline(layout, config, &vulkan_include)?;
    warn_missing_programs(&pipeline, &[config.generator_tool()]);

    pipeline.run(executor, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingExecutor;
    use crate::util::env::MemoryEnv;

    fn layout() -> ProjectLayout {
        ProjectLayout::new(std::env::temp_dir().join("evergreen")).unwrap()
    }

    fn env() -> EnvResolver {
        EnvResolver::new(
            MemoryEnv::new("user").with("VULKAN_SDK", "C:/VulkanSDK/1.4.309.0"),
            MemoryEnv::new("system"),
        )
    }

    #[test]
    fn test_stage_order() {
        let pipeline =
            generate_pipeline(&layout(), &Config::default(), Path::new("/sdk/Include")).unwrap();
        let titles: Vec<&str> = pipeline.stages.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Binding generator",
                "Evergreen.Physics native",
                "Physics bindings",
                "Evergreen.Graphics native",
                "Window bindings",
                "ImGui bindings",
                "Asset bindings",
                "Shader bindings",
            ]
        );
    }

    #[test]
    fn test_install_stage_uses_config() {
        let mut config = Config::default();
        config.generator.version = Some("19.0.0".to_string());
        let pipeline = generate_pipeline(&layout(), &config, Path::new("/sdk/Include")).unwrap();

        assert_eq!(
            pipeline.stages[0].steps[0].command.render(),
            "dotnet tool install --global ClangSharpPInvokeGenerator --version 19.0.0"
        );
    }

    #[test]
    fn test_bindings_stage_commands() {
        let layout = layout();
        let pipeline =
            generate_pipeline(&layout, &Config::default(), Path::new("/sdk/Include")).unwrap();
        let window = &pipeline.stages[4];

        assert_eq!(window.steps.len(), 3);
        assert_eq!(
            window.steps[0].command.get_program(),
            "ClangSharpPInvokeGenerator"
        );
        let project = layout
            .path("src/managed/Graphics/Window/Backend/Interop")
            .join("Evergreen.Graphics.Window.Backend.Interop.csproj");
        let args = window.steps[2].command.get_args();
        assert_eq!(args[..3], ["build", "-c", "Release"]);
        assert_eq!(Path::new(args[3]), project);
    }

    #[test]
    fn test_generate_runs_everything() {
        let mut exec = RecordingExecutor::new();
        let mut reporter = StageReporter::new(Vec::new());

        let report = generate(&layout(), &Config::default(), &env(), &mut exec, &mut reporter)
            .unwrap();

        assert_eq!(report.stages.len(), 8);
        // install + 2 native libs * 2 + 5 modules * 3
        assert_eq!(exec.calls().len(), 1 + 4 + 15);
        assert!(exec.lines()[0].starts_with("dotnet tool install"));
        assert!(exec
            .lines()
            .iter()
            .any(|l| l.contains("C:/VulkanSDK/1.4.309.0")));
    }

    #[test]
    fn test_missing_sdk_runs_nothing() {
        let env = EnvResolver::new(MemoryEnv::new("user"), MemoryEnv::new("system"));
        let mut exec = RecordingExecutor::new();
        let mut reporter = StageReporter::new(Vec::new());

        let err = generate(&layout(), &Config::default(), &env, &mut exec, &mut reporter)
            .unwrap_err();

        assert!(matches!(err, PipelineError::ConfigurationMissing { .. }));
        assert!(exec.calls().is_empty());
        assert!(reporter.into_inner().is_empty());
    }

    #[test]
    fn test_failure_stops_pipeline() {
        // Fail the Physics generator invocation (install, 2 native builds, codegen).
        let mut exec = RecordingExecutor::new().fail_at(3, 1);
        let mut reporter = StageReporter::new(Vec::new());

        let err = generate(&layout(), &Config::default(), &env(), &mut exec, &mut reporter)
            .unwrap_err();

        assert_eq!(err.exit_code(), 1);
        assert_eq!(exec.calls().len(), 4);
        assert!(exec.lines()[3].starts_with("ClangSharpPInvokeGenerator"));
        assert!(!exec.lines().iter().any(|l| l.starts_with("dotnet build")));
    }

    #[test]
    fn test_unknown_library_is_malformed() {
        let module = ModuleCodegenSpec::new("Audio", "Evergreen.Audio.Interop", "Audio.dll");
        let err = build_pipeline(&layout(), &Config::default(), &native_libraries(), &[module])
            .unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInvocation { .. }));
    }

    #[test]
    fn test_sixth_module_needs_no_code() {
        let mut modules = shipped_modules(Path::new("/sdk/Include"));
        modules.push(
            ModuleCodegenSpec::new(
                "Audio",
                "Evergreen.Graphics.Audio.Backend.Interop",
                "Evergreen.Graphics.Native.dll",
            )
            .header("src/native/libs/Evergreen.Graphics/egAudio.h")
            .output_dir("src/managed/Graphics/Audio/Backend/Interop")
            .project("src/managed/Graphics/Audio/Backend/Interop/Audio.csproj")
            .exclude(["EgAudioBool"])
            .rename("EgAudioBool", "System.Boolean"),
        );

        let pipeline =
            build_pipeline(&layout(), &Config::default(), &native_libraries(), &modules).unwrap();
        assert_eq!(pipeline.stages.last().unwrap().title, "Audio bindings");
        assert_eq!(pipeline.stages.len(), 9);
    }
}
