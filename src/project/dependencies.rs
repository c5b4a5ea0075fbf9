//! Third-party native libraries built before any Evergreen module.
//!
//! Each dependency is an ordered recipe of `(directory, command)` steps,
//! normally configure, then Debug build, then Release build.

use std::path::PathBuf;

use serde::Serialize;

use crate::util::process::CommandLine;

const EXTERNAL_DIR: &str = "src/native/external";

/// One command of a dependency recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupStep {
    /// Working directory, relative to the project root
    pub dir: PathBuf,
    pub command: CommandLine,
}

/// Build recipe for one third-party library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalDependencySpec {
    pub title: String,
    pub steps: Vec<SetupStep>,
}

impl ExternalDependencySpec {
    fn new(title: &str) -> Self {
        ExternalDependencySpec {
            title: title.to_string(),
            steps: Vec::new(),
        }
    }

    /// Add a step running `command` in `dir` under the external sources.
    fn step(mut self, dir: &str, command: CommandLine) -> Self {
        let dir = if dir.is_empty() {
            PathBuf::from(EXTERNAL_DIR)
        } else {
            PathBuf::from(EXTERNAL_DIR).join(dir)
        };
        self.steps.push(SetupStep { dir, command });
        self
    }
}

fn cmake(args: &[&str]) -> CommandLine {
    CommandLine::new("cmake").args(args)
}

fn msbuild(solution: &str, properties: &[&str]) -> CommandLine {
    CommandLine::new("msbuild").arg(solution).args(properties)
}

/// Dependencies in setup order.
pub fn shipped_dependencies() -> Vec<ExternalDependencySpec> {
    vec![
        ExternalDependencySpec::new("LunaSVG")
            .step("lunasvg", cmake(&["-B", "build", "."]))
            .step("lunasvg", cmake(&["--build", "build"])),
        ExternalDependencySpec::new("Freetype")
            .step("freetype", msbuild("MSBuild.sln", &["/p:Configuration=Debug"]))
            .step("freetype", msbuild("MSBuild.sln", &["/p:Configuration=Release"])),
        ExternalDependencySpec::new("JoltPhysics")
            .step("JoltPhysics/Build", CommandLine::new("cmake_vs2026_cl.bat"))
            .step("JoltPhysics/Build/VS2026_CL", msbuild("JoltPhysics.slnx", &[]))
            .step(
                "JoltPhysics/Build/VS2026_CL",
                msbuild("JoltPhysics.slnx", &["/p:Configuration=Release"]),
            ),
        ExternalDependencySpec::new("VulkanMemoryAllocator")
            .step(
                "VulkanMemoryAllocator",
                cmake(&["-S", ".", "-B", "build", "-D", "VMA_BUILD_SAMPLES=ON"]),
            )
            .step("VulkanMemoryAllocator", msbuild(r"build\VMA.sln", &[]))
            .step(
                "VulkanMemoryAllocator",
                msbuild(r"build\VMA.sln", &["/p:Configuration=Release"]),
            ),
        ExternalDependencySpec::new("SDL")
            .step("SDL/VisualC", msbuild("SDL.sln", &["/p:Platform=x64"]))
            .step(
                "SDL/VisualC",
                msbuild("SDL.sln", &["/p:Configuration=Release", "/p:Platform=x64"]),
            ),
        ExternalDependencySpec::new("assimp")
            .step("assimp", cmake(&["CMakeLists.txt"]))
            .step("assimp", msbuild("assimp.sln", &[]))
            .step("assimp", msbuild("assimp.sln", &["/p:Configuration=Release"])),
        ExternalDependencySpec::new("glslang")
            .step(
                "glslang",
                CommandLine::new("python").arg("update_glslang_sources.py"),
            )
            .step("glslang", CommandLine::new("mkdir").arg("build"))
            .step("glslang/build", cmake(&["../"]))
            .step("glslang/build", cmake(&["--build", ".", "--config", "Debug"]))
            .step("glslang/build", cmake(&["--build", ".", "--config", "Release"])),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(title: &str) -> ExternalDependencySpec {
        shipped_dependencies()
            .into_iter()
            .find(|d| d.title == title)
            .unwrap()
    }

    #[test]
    fn test_setup_order() {
        let titles: Vec<String> = shipped_dependencies().into_iter().map(|d| d.title).collect();
        assert_eq!(
            titles,
            vec![
                "LunaSVG",
                "Freetype",
                "JoltPhysics",
                "VulkanMemoryAllocator",
                "SDL",
                "assimp",
                "glslang"
            ]
        );
    }

    #[test]
    fn test_release_build_follows_debug_build() {
        for dep in shipped_dependencies() {
            let lines: Vec<String> = dep.steps.iter().map(|s| s.command.render()).collect();
            let release = lines
                .iter()
                .position(|l| l.contains("Release"))
                .unwrap_or_else(|| lines.len() - 1);
            assert_eq!(release, lines.len() - 1, "{}: {:?}", dep.title, lines);
        }
    }

    #[test]
    fn test_glslang_recipe() {
        let glslang = find("glslang");
        let lines: Vec<String> = glslang.steps.iter().map(|s| s.command.render()).collect();
        assert_eq!(
            lines,
            vec![
                "python update_glslang_sources.py",
                "mkdir build",
                "cmake ../",
                "cmake --build . --config Debug",
                "cmake --build . --config Release",
            ]
        );
        assert_eq!(
            glslang.steps[2].dir,
            PathBuf::from(EXTERNAL_DIR).join("glslang/build")
        );
    }

    #[test]
    fn test_sdl_builds_x64() {
        let sdl = find("SDL");
        assert_eq!(
            sdl.steps[1].command.render(),
            "msbuild SDL.sln /p:Configuration=Release /p:Platform=x64"
        );
        assert!(sdl.steps.iter().all(|s| s.dir.ends_with("SDL/VisualC")));
    }
}
