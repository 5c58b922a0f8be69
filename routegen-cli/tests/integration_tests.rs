//! Integration tests for routegen-cli.
//!
//! These drive the library pieces the binary composes: configuration
//! loading, generation through the real filesystem, and the dry-run
//! comparison behind `routegen check`.

use std::fs;
use tempfile::TempDir;

use routegen::{generate_with_options, OsDeps};
use routegen_cli::{
    config::{CliArgs, Config, ConfigManager},
    writer::{DryRunDeps, WriteStatus},
};

const GET_CONFIG: &str = r#"
const query = z.object({ q: z.string().optional() });
export const requestValidator = createRequestValidator({ searchParams: query });
export const responseValidator = z.object({ items: z.array(z.string()) });
export async function handler() { return { items: [] }; }
"#;

/// Create a temporary directory with test files.
fn create_temp_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn stale_count(deps: &DryRunDeps<OsDeps>) -> usize {
    deps.statuses()
        .iter()
        .filter(|(_, status)| *status != WriteStatus::Unchanged)
        .count()
}

#[test]
fn test_config_file_drives_generation() {
    let dir = create_temp_project(&[
        ("web/pages/api/search/route.get.config.ts", GET_CONFIG),
        (
            "routegen.toml",
            "[project]\nroot = \"web\"\n\n[output]\ndir = \"__gen__\"\n",
        ),
    ]);

    let config = ConfigManager::load(Some(&dir.path().join("routegen.toml"))).unwrap();
    let config = ConfigManager::merge_cli_args(
        config,
        &CliArgs {
            root: Some(dir.path().join("web")),
            ..Default::default()
        },
    );
    config.validate().unwrap();

    let result = generate_with_options(&OsDeps::new(), &config.generate_options());

    assert!(result.success, "{:?}", result.error);
    let out = dir.path().join("web/pages/api/search/__gen__");
    assert!(out.join("handler.ts").is_file());
    assert!(out.join("README.md").is_file());
    assert!(!dir.path().join("web/pages/api/search/.generated").exists());
}

#[test]
fn test_check_flow_detects_stale_output() {
    let dir = create_temp_project(&[("app/api/search/route.get.config.ts", GET_CONFIG)]);
    let options = routegen::GenerateOptions::default().with_root(dir.path());

    // Nothing generated yet: every file is new.
    let before = DryRunDeps::new(OsDeps::new());
    assert!(generate_with_options(&before, &options).success);
    assert_eq!(stale_count(&before), 3);

    assert!(generate_with_options(&OsDeps::new(), &options).success);

    let fresh = DryRunDeps::new(OsDeps::new());
    assert!(generate_with_options(&fresh, &options).success);
    assert_eq!(stale_count(&fresh), 0);

    fs::write(
        dir.path().join("app/api/search/.generated/client.ts"),
        "// edited by hand\n",
    )
    .unwrap();

    let edited = DryRunDeps::new(OsDeps::new());
    assert!(generate_with_options(&edited, &options).success);
    let stale: Vec<_> = edited
        .statuses()
        .into_iter()
        .filter(|(_, status)| *status == WriteStatus::Changed)
        .map(|(write, _)| write.path)
        .collect();
    assert_eq!(stale.len(), 1);
    assert!(stale[0].ends_with("client.ts"));
}

#[test]
fn test_respect_gitignore_setting_controls_discovery() {
    let dir = create_temp_project(&[
        (".gitignore", "legacy/\n"),
        ("app/api/search/route.get.config.ts", GET_CONFIG),
        ("legacy/app/api/old/route.get.config.ts", GET_CONFIG),
    ]);
    // .gitignore only applies inside a git repository
    fs::create_dir(dir.path().join(".git")).unwrap();

    let mut config = Config::default();
    config.project.root = dir.path().to_path_buf();

    let result = generate_with_options(&config.os_deps(), &config.generate_options());
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.generated.unwrap().len(), 1);
    assert!(!dir.path().join("legacy/app/api/old/.generated").exists());

    config.scan.respect_gitignore = false;
    let result = generate_with_options(&config.os_deps(), &config.generate_options());
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.generated.unwrap().len(), 2);
    assert!(dir.path().join("legacy/app/api/old/.generated/route.ts").is_file());
}

#[test]
fn test_default_config_content_is_loadable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("routegen.toml");
    fs::write(&path, ConfigManager::default_config_content()).unwrap();

    let config = ConfigManager::load(Some(&path)).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.project.framework, "auto");
}
