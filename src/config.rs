//! Project configuration (`tsonic.json`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tsonic_common::{CompilerOptions, NamingPolicy, RuntimeMode};
use tsonic_types::BindingsRegistry;

/// On-disk project file shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub source_root: Option<PathBuf>,
    pub root_namespace: Option<String>,
    pub runtime: Option<RuntimeMode>,
    pub naming_policy: Option<NamingPolicy>,
    pub entry_point: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    /// Path to a bindings file produced by the package toolchain.
    pub bindings: Option<PathBuf>,
}

/// A resolved project: compiler options plus driver-side paths.
#[derive(Debug)]
pub struct Project {
    pub options: CompilerOptions,
    pub out_dir: PathBuf,
    pub bindings: BindingsRegistry,
}

/// Load `tsonic.json` from the project directory. A missing file yields
/// defaults rooted at the project directory.
pub fn load_project(project_dir: &Path, config_path: Option<&Path>) -> Result<Project> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| project_dir.join("tsonic.json"));

    let config: ProjectConfig = if path.exists() {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
    } else {
        ProjectConfig::default()
    };

    let source_root = config
        .source_root
        .map(|root| project_dir.join(root))
        .unwrap_or_else(|| project_dir.join("src"));

    let entry_point_path = config.entry_point.map(|entry| source_root.join(entry));
    let options = CompilerOptions {
        source_root,
        root_namespace: config.root_namespace.unwrap_or_else(|| "App".to_string()),
        runtime: config.runtime.unwrap_or_default(),
        naming_policy: config.naming_policy.unwrap_or_default(),
        is_entry_point: entry_point_path.is_some(),
        entry_point_path,
    };

    let bindings = match config.bindings {
        Some(bindings_path) => {
            let full = project_dir.join(bindings_path);
            let text = std::fs::read_to_string(&full)
                .with_context(|| format!("reading {}", full.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", full.display()))?
        }
        None => BindingsRegistry::new(),
    };

    Ok(Project {
        options,
        out_dir: config
            .out_dir
            .map(|dir| project_dir.join(dir))
            .unwrap_or_else(|| project_dir.join("generated")),
        bindings,
    })
}

/// Discover `.ts` input files under the source root, sorted for
/// deterministic ordering.
pub fn discover_inputs(source_root: &Path) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = walkdir::WalkDir::new(source_root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|extension| extension == "ts")
        })
        .map(|entry| entry.into_path())
        .collect();
    inputs.sort();
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let project = load_project(dir.path(), None).expect("load");
        assert_eq!(project.options.root_namespace, "App");
        assert_eq!(project.options.source_root, dir.path().join("src"));
        assert!(project.bindings.is_empty());
    }

    #[test]
    fn config_overrides_apply() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("tsonic.json"),
            r#"{ "rootNamespace": "Acme.Tool", "runtime": "js", "entryPoint": "main.ts" }"#,
        )
        .expect("write config");
        let project = load_project(dir.path(), None).expect("load");
        assert_eq!(project.options.root_namespace, "Acme.Tool");
        assert_eq!(project.options.runtime, RuntimeMode::Js);
        assert!(project.options.is_entry_point);
    }

    #[test]
    fn discovery_is_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("util")).expect("mkdir");
        std::fs::write(src.join("zeta.ts"), "").expect("write");
        std::fs::write(src.join("alpha.ts"), "").expect("write");
        std::fs::write(src.join("util/helper.ts"), "").expect("write");
        std::fs::write(src.join("notes.md"), "").expect("write");
        let inputs = discover_inputs(&src);
        assert_eq!(inputs.len(), 3);
        assert!(inputs[0].ends_with("alpha.ts"));
    }
}
