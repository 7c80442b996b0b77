//! CLI helpers behind `migrant list` and `migrant run`.
//!
//! Sources are `SourceFile` JSON documents produced by an external parser.
//! Named files are taken as given; directories are walked for `*.json`.
//! Every helper returns `Result<T, MigrantError>` so `main` can map failures
//! to stable exit codes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use migrant_core::template::ArenaTemplateEngine;
use migrant_core::{run_recipes, Config, MigrantError, Recipe, RecipeDescriptor, SourceFile};

use crate::output::{FileResult, RunResponse};

/// Options for [`run`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Recipe names from the command line.
    pub recipes: Vec<String>,
    /// Explicit config file; otherwise `.migrant/config.toml` under `project_root`.
    pub config: Option<PathBuf>,
    pub project_root: PathBuf,
    /// Files or directories.
    pub paths: Vec<PathBuf>,
    /// Write rewritten trees back over their inputs.
    pub write: bool,
}

/// A rewritten unit with its per-file result.
#[derive(Debug, Clone)]
pub struct RunItem {
    pub source: SourceFile,
    pub result: FileResult,
}

/// Everything [`run`] produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub recipes: Vec<String>,
    pub items: Vec<RunItem>,
}

impl RunReport {
    pub fn into_response(self) -> RunResponse {
        RunResponse::new(
            self.recipes,
            self.items.into_iter().map(|item| item.result).collect(),
        )
    }
}

/// Descriptors of every registered recipe.
pub fn list_recipes() -> Vec<RecipeDescriptor> {
    migrant_junit::all_recipes()
        .iter()
        .map(|recipe| recipe.descriptor())
        .collect()
}

/// Look up each name in the registry, failing on the first unknown one.
pub fn resolve_recipes(names: &[String]) -> Result<Vec<Box<dyn Recipe>>, MigrantError> {
    if names.is_empty() {
        return Err(MigrantError::invalid_args(
            "no recipes named (use --recipe or [run] recipes in config)",
        ));
    }
    names
        .iter()
        .map(|name| {
            migrant_junit::find_recipe(name).ok_or_else(|| MigrantError::unknown_recipe(name))
        })
        .collect()
}

/// Expand `paths` into the list of source files, sorted within each directory.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>, MigrantError> {
    if paths.is_empty() {
        return Err(MigrantError::invalid_args("no input paths given"));
    }
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            found.sort();
            debug!(dir = %path.display(), count = found.len(), "collected sources");
            files.extend(found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(MigrantError::file_not_found(path.display().to_string()));
        }
    }
    Ok(files)
}

/// Read, deserialize and validate one source file.
pub fn load_source(path: &Path) -> Result<SourceFile, MigrantError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MigrantError::file_not_found(&display),
        _ => MigrantError::io(&display, e),
    })?;
    let source: SourceFile =
        serde_json::from_str(&content).map_err(|e| MigrantError::invalid_source(&display, e))?;
    source
        .validate()
        .map_err(|e| MigrantError::from_tree(&display, e))?;
    Ok(source)
}

/// Serialize `source` back over `path`.
pub fn write_source(path: &Path, source: &SourceFile) -> Result<(), MigrantError> {
    let display = path.display().to_string();
    let json = serde_json::to_string_pretty(source)
        .map_err(|e| MigrantError::internal(format!("failed to serialize {}: {}", display, e)))?;
    fs::write(path, json + "\n").map_err(|e| MigrantError::io(display, e))
}

/// Load config, resolve recipes, load every collected source, then rewrite
/// them in turn.
pub fn run(options: &RunOptions) -> Result<RunReport, MigrantError> {
    let config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_project(&options.project_root)?,
    };
    let names = config.merge_recipes(&options.recipes);
    let recipes = resolve_recipes(&names)?;
    let recipe_refs: Vec<&dyn Recipe> = recipes.iter().map(|r| r.as_ref()).collect();
    let engine = ArenaTemplateEngine::new(config.classpath());

    // Every source must load before anything is written back.
    let sources = collect_sources(&options.paths)?
        .into_iter()
        .map(|file| load_source(&file).map(|source| (file, source)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut items = Vec::with_capacity(sources.len());
    for (file, source) in sources {
        let outcome = run_recipes(&recipe_refs, source, &engine);
        let written = options.write && outcome.changed;
        if written {
            write_source(&file, &outcome.source)?;
        }
        items.push(RunItem {
            result: FileResult {
                path: file.display().to_string(),
                changed: outcome.changed,
                written,
                diagnostics: outcome.diagnostics,
            },
            source: outcome.source,
        });
    }

    let changed = items.iter().filter(|item| item.result.changed).count();
    info!(files = items.len(), changed, "run finished");
    Ok(RunReport {
        recipes: names,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_recipes_errors() {
        let err = resolve_recipes(&[]).err().unwrap();
        assert!(matches!(err, MigrantError::InvalidArguments { .. }));

        let names = vec![
            "junit5.test-rule-to-test-info".to_string(),
            "cleanup.nope".to_string(),
        ];
        let err = resolve_recipes(&names).err().unwrap();
        assert!(matches!(err, MigrantError::UnknownRecipe { name } if name == "cleanup.nope"));
    }

    #[test]
    fn test_collect_sources_walks_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("nested").join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = collect_sources(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(
            files,
            vec![
                dir.path().join("b.json"),
                dir.path().join("nested").join("a.json"),
            ]
        );
    }

    #[test]
    fn test_collect_sources_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = collect_sources(&[dir.path().join("absent.json")])
            .err()
            .unwrap();
        assert!(matches!(err, MigrantError::FileNotFound { .. }));
    }

    #[test]
    fn test_run_writes_nothing_when_a_source_is_malformed() {
        use migrant_core::tree::{JavaType, MethodType, TreeBuilder};

        let dir = TempDir::new().unwrap();
        let mut b = TreeBuilder::new();
        let import = b.static_import("org.junit.jupiter.api.Assertions", "assertFalse");
        let a = b.ident("a", Some(JavaType::primitive("boolean")));
        let not = b.not(a);
        let call = b.invoke(
            None,
            MethodType::new(
                "org.junit.jupiter.api.Assertions",
                "assertFalse",
                &["boolean"],
                "void",
            ),
            vec![not],
        );
        let method = b.method(vec![], &[], "check", vec![], vec![call]);
        let class = b.class(vec![], &[], "SampleTest", vec![method]);
        let unit = b.unit(None, vec![import], vec![class]);
        let valid = serde_json::to_string(&b.finish("a.json", unit)).unwrap();
        fs::write(dir.path().join("a.json"), &valid).unwrap();
        fs::write(dir.path().join("b.json"), "{ not json").unwrap();

        let options = RunOptions {
            recipes: vec!["cleanup.assert-false-negation-to-assert-true".to_string()],
            project_root: dir.path().to_path_buf(),
            paths: vec![dir.path().to_path_buf()],
            write: true,
            ..RunOptions::default()
        };
        let err = run(&options).err().unwrap();

        assert!(matches!(err, MigrantError::InvalidSource { .. }));
        assert_eq!(fs::read_to_string(dir.path().join("a.json")).unwrap(), valid);
    }

    #[test]
    fn test_load_source_rejects_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"path\": 1}").unwrap();

        let err = load_source(&path).err().unwrap();
        assert!(matches!(err, MigrantError::InvalidSource { .. }));
    }
}
