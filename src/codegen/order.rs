//! Ordering between modules whose renames reference each other.
//!
//! A module that renames a native type to a type in another module's
//! generated namespace can only be generated after that module. The shipped
//! module list is hand-ordered; this check keeps it honest.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use super::ModuleCodegenSpec;
use crate::util::diagnostic::PipelineError;

/// Edges `(provider, consumer)` by index into `modules`.
///
/// `consumer` has a rename whose target lives in `provider`'s namespace.
pub fn module_dependencies(modules: &[ModuleCodegenSpec]) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();

    for (consumer, spec) in modules.iter().enumerate() {
        for (provider, other) in modules.iter().enumerate() {
            if provider == consumer {
                continue;
            }
            let prefix = format!("{}.", other.namespace);
            if spec.renames.iter().any(|r| r.target.starts_with(&prefix)) {
                edges.push((provider, consumer));
            }
        }
    }

    edges
}

/// Fail if a module is listed before a module it depends on, or if the
/// dependencies form a cycle.
pub fn check_module_order(modules: &[ModuleCodegenSpec]) -> Result<(), PipelineError> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..modules.len()).map(|i| graph.add_node(i)).collect();

    let edges = module_dependencies(modules);
    for &(provider, consumer) in &edges {
        graph.add_edge(nodes[provider], nodes[consumer], ());
    }

    if let Err(cycle) = toposort(&graph, None) {
        let module = &modules[graph[cycle.node_id()]];
        return Err(PipelineError::malformed(
            &module.title,
            "module renames form a cycle",
        ));
    }

    for (provider, consumer) in edges {
        if provider > consumer {
            return Err(PipelineError::malformed(
                &modules[consumer].title,
                format!(
                    "renames types from `{}`, which is generated later",
                    modules[provider].namespace
                ),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> ModuleCodegenSpec {
        ModuleCodegenSpec::new("Window", "Graphics.Window.Interop", "g.dll")
    }

    fn imgui() -> ModuleCodegenSpec {
        ModuleCodegenSpec::new("ImGui", "Graphics.UI.Interop", "g.dll")
            .rename("EgWindow", "Graphics.Window.Interop.EgWindow")
            .rename("VkQueue", "TerraFX.Interop.Vulkan.VkQueue")
    }

    #[test]
    fn test_dependencies() {
        let modules = vec![window(), imgui()];
        assert_eq!(module_dependencies(&modules), vec![(0, 1)]);
    }

    #[test]
    fn test_declared_order_ok() {
        assert!(check_module_order(&[window(), imgui()]).is_ok());
    }

    #[test]
    fn test_reversed_order_rejected() {
        let err = check_module_order(&[imgui(), window()]).unwrap_err();
        assert!(err.to_string().contains("ImGui"));
        assert!(err.to_string().contains("Graphics.Window.Interop"));
    }

    #[test]
    fn test_namespace_prefix_must_be_whole_segment() {
        // `Graphics.Window.InteropExtra.X` is not inside `Graphics.Window.Interop`.
        let other = ModuleCodegenSpec::new("Other", "Other.Interop", "o.dll")
            .rename("X", "Graphics.Window.InteropExtra.X");
        assert!(module_dependencies(&[other, window()]).is_empty());
    }

    #[test]
    fn test_cycle_rejected() {
        let a = ModuleCodegenSpec::new("A", "A.Interop", "a.dll").rename("B", "B.Interop.B");
        let b = ModuleCodegenSpec::new("B", "B.Interop", "b.dll").rename("A", "A.Interop.A");
        let err = check_module_order(&[a, b]).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }
}
