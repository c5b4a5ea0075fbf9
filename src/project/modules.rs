//! Native libraries and the modules generated from their headers.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::codegen::ModuleCodegenSpec;

/// Third-party Vulkan bindings the ImGui module maps Vulkan handles onto.
const THIRD_PARTY_VULKAN: &str = "TerraFX.Interop.Vulkan";

/// A native solution that one or more modules bind against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeLibrary {
    pub title: String,
    /// Solution file, relative to the project root
    pub solution: PathBuf,
    /// Binary the generated bindings load
    pub binary: String,
}

impl NativeLibrary {
    fn new(name: &str) -> Self {
        NativeLibrary {
            title: name.to_string(),
            solution: PathBuf::from(format!("src/native/libs/{name}/{name}.sln")),
            binary: format!("{name}.Native.dll"),
        }
    }
}

/// Native libraries, in build order.
pub fn native_libraries() -> Vec<NativeLibrary> {
    vec![
        NativeLibrary::new("Evergreen.Physics"),
        NativeLibrary::new("Evergreen.Graphics"),
    ]
}

fn module(
    title: &str,
    namespace: &str,
    native: &str,
    header: &str,
    managed_dir: &str,
) -> ModuleCodegenSpec {
    let managed_dir = PathBuf::from("src/managed").join(managed_dir);
    let project = managed_dir.join(format!("{namespace}.csproj"));
    ModuleCodegenSpec::new(title, namespace, format!("{native}.Native.dll"))
        .header(format!("src/native/libs/{native}/{header}"))
        .output_dir(&managed_dir)
        .project(project)
}

/// Modules in generation order.
///
/// Window comes before ImGui: ImGui renames `EgWindow` into the Window
/// module's namespace.
pub fn shipped_modules(vulkan_include: &Path) -> Vec<ModuleCodegenSpec> {
    let physics = module(
        "Physics",
        "Evergreen.Physics.Backend.Jolt.Interop",
        "Evergreen.Physics",
        "egJolt.h",
        "Physics/Backend/Jolt/Interop",
    )
    .exclude([
        "EgJoltVector3",
        "EgJoltVector4",
        "EgJoltQuaternion",
        "EgJoltMatrix4x4",
    ])
    .rename("EgJoltVector3", "System.Numerics.Vector3")
    .rename("EgJoltVector4", "System.Numerics.Vector4")
    .rename("EgJoltQuaternion", "System.Numerics.Quaternion")
    .rename("EgJoltMatrix4x4", "System.Numerics.Matrix4x4")
    // Jolt bindings land in an `api` subdirectory of the project.
    .output_dir("src/managed/Physics/Backend/Jolt/Interop/api");

    let window = module(
        "Window",
        "Evergreen.Graphics.Window.Backend.Interop",
        "Evergreen.Graphics",
        "egWindow.h",
        "Graphics/Window/Backend/Interop",
    )
    .include_dir("src/native/external/SDL/include")
    .exclude(["EgWindowVector2", "EgWindowBool"])
    .rename("EgWindowVector2", "System.Numerics.Vector2")
    .rename("EgWindowBool", "System.Boolean");

    let mut imgui = module(
        "ImGui",
        "Evergreen.Graphics.UI.Backend.ImGui.Interop",
        "Evergreen.Graphics",
        "egImGui.h",
        "Graphics/UI/Backend/ImGui/Interop",
    )
    .include_dir(vulkan_include)
    .include_dir("src/native/external/imgui")
    .exclude(["EgImGuiVector2", "EgImGuiVector4", "EgImGuiBool"]);
    for vk in [
        "VkQueue",
        "VkDevice",
        "VkRenderPass",
        "VkPhysicalDevice",
        "VkInstance",
        "VkDescriptorSet",
        "VkPipeline",
        "VkImageView",
        "VkSampler",
        "VkImageLayout",
        "VkCommandPool",
        "VkCommandBuffer",
        "VkResult",
        "VkDescriptorPool",
    ] {
        imgui = imgui.rename(vk, format!("{THIRD_PARTY_VULKAN}.{vk}"));
    }
    imgui = imgui
        .rename("EgImGuiVector2", "System.Numerics.Vector2")
        .rename("EgImGuiVector4", "System.Numerics.Vector4")
        .rename("EgImGuiBool", "System.Boolean")
        .rename("EgWindow", "Evergreen.Graphics.Window.Backend.Interop.EgWindow");
    for flag in [
        "NoNavInputs",
        "NoNavFocus",
        "NoTitleBar",
        "NoResize",
        "NoScrollbar",
        "NoCollapse",
        "NoMouseInputs",
    ] {
        imgui = imgui.rename(format!("EgImGuiWindowFlags_{flag}"), flag);
    }

    let asset = module(
        "Asset",
        "Evergreen.Graphics.Asset.Backend.Interop",
        "Evergreen.Graphics",
        "egAsset.h",
        "Graphics/Asset/Backend/Interop",
    )
    .exclude([
        "EgAssetVector2",
        "EgAssetVector3",
        "EgAssetVector4",
        "EgAssetBool",
    ])
    .rename("EgAssetVector2", "System.Numerics.Vector2")
    .rename("EgAssetVector3", "System.Numerics.Vector3")
    .rename("EgAssetVector4", "System.Numerics.Vector4")
    .rename("EgAssetBool", "System.Boolean");

    let shader = module(
        "Shader",
        "Evergreen.Graphics.Shader.Backend.Interop",
        "Evergreen.Graphics",
        "egShader.h",
        "Graphics/Shader/Backend/Interop",
    )
    .exclude(["EgShaderBool"])
    .rename("EgShaderBool", "System.Boolean");

    vec![physics, window, imgui, asset, shader]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{check_module_order, CodegenInvocation};

    fn modules() -> Vec<ModuleCodegenSpec> {
        shipped_modules(Path::new("C:/VulkanSDK/1.4.309.0/Include"))
    }

    #[test]
    fn test_every_exclusion_is_renamed() {
        for spec in modules() {
            for name in &spec.excluded {
                assert!(
                    spec.rename_of(name).is_some(),
                    "{}: `{}` excluded but not renamed",
                    spec.title,
                    name
                );
            }
            spec.validate().unwrap();
        }
    }

    #[test]
    fn test_shipped_order_is_consistent() {
        let modules = modules();
        let titles: Vec<&str> = modules.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Physics", "Window", "ImGui", "Asset", "Shader"]);
        check_module_order(&modules).unwrap();
    }

    #[test]
    fn test_every_module_binds_a_native_library() {
        let binaries: Vec<String> = native_libraries().into_iter().map(|l| l.binary).collect();
        for spec in modules() {
            assert!(binaries.contains(&spec.library), "{}", spec.library);
        }
    }

    #[test]
    fn test_window_module() {
        let window = &modules()[1];
        assert_eq!(window.namespace, "Evergreen.Graphics.Window.Backend.Interop");
        assert_eq!(window.excluded, vec!["EgWindowVector2", "EgWindowBool"]);
        assert_eq!(window.rename_of("EgWindowBool"), Some("System.Boolean"));
        assert_eq!(
            window.project,
            PathBuf::from("src/managed/Graphics/Window/Backend/Interop")
                .join("Evergreen.Graphics.Window.Backend.Interop.csproj")
        );

        let line = CodegenInvocation::new(window).build().unwrap().render();
        assert_eq!(line.matches("EgWindowVector2=System.Numerics.Vector2").count(), 1);
        assert_eq!(line.matches("EgWindowBool=System.Boolean").count(), 1);
    }

    #[test]
    fn test_physics_output_in_api_dir() {
        let physics = &modules()[0];
        assert_eq!(
            physics.output_dir,
            Path::new("src/managed/Physics/Backend/Jolt/Interop/api")
        );
        assert!(physics
            .project
            .ends_with("Jolt/Interop/Evergreen.Physics.Backend.Jolt.Interop.csproj"));
    }

    #[test]
    fn test_imgui_uses_sdk_include_first() {
        let imgui = &modules()[2];
        assert_eq!(
            imgui.include_dirs[0],
            PathBuf::from("C:/VulkanSDK/1.4.309.0/Include")
        );
        assert_eq!(
            imgui.rename_of("VkQueue"),
            Some("TerraFX.Interop.Vulkan.VkQueue")
        );
        assert_eq!(
            imgui.rename_of("EgImGuiWindowFlags_NoNavFocus"),
            Some("NoNavFocus")
        );
    }
}
