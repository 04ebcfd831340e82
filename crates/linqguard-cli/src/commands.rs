//! CLI command implementations

use anyhow::Context;
use linqguard_core::{
    ConfigLoader, Diagnostic, FileMatcher, LibraryCatalog, LinqGuardConfig, LinqGuardError,
    ResultExt, SemanticModel, SourceUnit,
};
use linqguard_rules::{FixOptions, apply_fix_all_with, builtin_rules, find_violations};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::OutputFormat;
use crate::output::{self, CheckSummary, FileFix, FileReport};

/// Check command implementation
///
/// Returns the process exit code: 1 when any diagnostic was reported.
pub fn check_command(
    paths: &[PathBuf],
    format: OutputFormat,
    config_path: Option<&Path>,
) -> anyhow::Result<i32> {
    let start = Instant::now();
    let config = load_config(paths, config_path)?;
    let files = discover_files(paths, &config.files.matcher()?)?;
    info!("Checking {} file(s)", files.len());

    let catalog = config.library_catalog();
    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| analyze_file(path, &catalog).recoverable())
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect();

    let summary = CheckSummary::from_reports(&reports, start.elapsed());
    match format {
        OutputFormat::Human => output::print_human(&reports, &summary),
        OutputFormat::Json => output::print_json(&reports, &summary)?,
    }

    Ok(if summary.diagnostics > 0 { 1 } else { 0 })
}

/// Fix command implementation
///
/// Exit code 1 means some diagnostics were left in place.
pub fn fix_command(
    paths: &[PathBuf],
    dry_run: bool,
    r#unsafe: bool,
    config_path: Option<&Path>,
) -> anyhow::Result<i32> {
    let config = load_config(paths, config_path)?;
    let files = discover_files(paths, &config.files.matcher()?)?;
    let mut options = FixOptions::from(&config.fix);
    if r#unsafe {
        options.allow_side_effecting_receivers = true;
    }
    debug!("Fixing {} file(s) with {:?}", files.len(), options);

    let catalog = config.library_catalog();
    let fixes: Vec<FileFix> = files
        .par_iter()
        .map(|path| fix_file(path, &catalog, &options, dry_run).recoverable())
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect();

    output::print_fixes(&fixes, dry_run);

    let remaining = fixes
        .iter()
        .any(|fix| !fix.failures.is_empty() || !fix.skipped.is_empty());
    Ok(if remaining { 1 } else { 0 })
}

/// Rules command implementation
pub fn rules_command(format: OutputFormat) -> anyhow::Result<i32> {
    let rules = builtin_rules();
    match format {
        OutputFormat::Human => output::print_rules(&rules),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rules)?),
    }
    Ok(0)
}

fn load_config(paths: &[PathBuf], config_path: Option<&Path>) -> anyhow::Result<LinqGuardConfig> {
    // Discovery starts next to the first path so a project's config applies
    // when linqguard runs from elsewhere
    let start_dir = paths.first().map(|path| {
        if path.is_file() {
            path.parent().unwrap_or_else(|| Path::new("."))
        } else {
            path.as_path()
        }
    });
    let start_dir = start_dir.filter(|dir| !dir.as_os_str().is_empty() && dir.exists());

    let config =
        ConfigLoader::load(config_path, start_dir).context("failed to load configuration")?;
    config.validate()?;
    Ok(config)
}

/// Source files under `paths`, sorted and without duplicates
///
/// Files named explicitly are always taken. Directory entries are matched
/// against the configured patterns relative to the directory.
pub fn discover_files(paths: &[PathBuf], matcher: &FileMatcher) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for root in paths {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }
        if !root.is_dir() {
            anyhow::bail!("path not found: {}", root.display());
        }

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry.with_context(|| format!("cannot walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if matcher.is_match(relative) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn read_unit(path: &Path) -> Result<SourceUnit, LinqGuardError> {
    let text = fs::read_to_string(path).map_err(|e| LinqGuardError::io_error(path, e))?;
    let unit = SourceUnit::parse(&text).with_path(path);
    if unit.has_errors() {
        debug!("{}: {} lexer error(s)", path.display(), unit.errors().len());
    }
    Ok(unit)
}

fn analyze_file(path: &Path, catalog: &LibraryCatalog) -> Result<FileReport, LinqGuardError> {
    let unit = read_unit(path)?;
    let model = SemanticModel::build(&unit, catalog);
    let diagnostics: Vec<Diagnostic> = find_violations(&unit, &model).collect();
    debug!("{}: {} diagnostic(s)", path.display(), diagnostics.len());

    Ok(FileReport {
        path: path.to_path_buf(),
        source: unit.text(),
        diagnostics,
    })
}

fn fix_file(
    path: &Path,
    catalog: &LibraryCatalog,
    options: &FixOptions,
    dry_run: bool,
) -> Result<FileFix, LinqGuardError> {
    let unit = read_unit(path)?;
    let model = SemanticModel::build(&unit, catalog);
    let locations: Vec<_> = find_violations(&unit, &model).map(|d| d.location).collect();

    let original = unit.text();
    let outcome = apply_fix_all_with(&unit, &locations, options);
    for failure in &outcome.failures {
        debug!("{}", LinqGuardError::fix_error(path, failure.error.to_string()));
    }

    let fixed = outcome.unit.text();
    let diff = if outcome.changed() && dry_run {
        Some(output::unified_diff(path, &original, &fixed))
    } else {
        None
    };
    if outcome.changed() && !dry_run {
        fs::write(path, &fixed).map_err(|e| LinqGuardError::io_error(path, e))?;
        info!("Fixed {} call(s) in {}", outcome.applied.len(), path.display());
    }

    Ok(FileFix {
        path: path.to_path_buf(),
        source: original,
        applied: outcome.applied.len(),
        skipped: outcome.skipped,
        failures: outcome.failures,
        diff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linqguard_core::FilesConfig;
    use tempfile::TempDir;

    #[test]
    fn test_discover_files_applies_patterns() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("obj/Debug")).unwrap();
        fs::write(dir.path().join("src/A.cs"), "class A {}").unwrap();
        fs::write(dir.path().join("src/notes.txt"), "").unwrap();
        fs::write(dir.path().join("obj/Debug/Gen.cs"), "class G {}").unwrap();

        let matcher = FilesConfig::default().matcher().unwrap();
        let files = discover_files(&[dir.path().to_path_buf()], &matcher).unwrap();

        assert_eq!(files, vec![dir.path().join("src/A.cs")]);
    }

    #[test]
    fn test_explicit_files_bypass_patterns() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("script.csx");
        fs::write(&file, "").unwrap();

        let matcher = FilesConfig::default().matcher().unwrap();
        let files = discover_files(&[file.clone(), file.clone()], &matcher).unwrap();

        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let matcher = FilesConfig::default().matcher().unwrap();
        assert!(discover_files(&[PathBuf::from("/no/such/dir")], &matcher).is_err());
    }
}
