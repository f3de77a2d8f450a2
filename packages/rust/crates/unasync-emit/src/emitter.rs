//! Mirror package emitter.
//!
//! Reads the fixed module list plus the resource directory, rewrites every
//! file in parallel, validates the rename tables against what was found and
//! publishes the whole mirror in one directory swap.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use unasync_ast::{PythonParser, top_level_symbols};
use unasync_io::{StagedDir, read_source};
use unasync_rewrite::{RenameTable, RewriteReport, TreeRewriter};
use walkdir::WalkDir;

use crate::config::EmitConfig;
use crate::diff::generate_unified_diff;
use crate::error::EmitError;
use crate::manifest::{MANIFEST_FILE, render_manifest};
use crate::validate::{ModuleSymbols, check_rename_drift};

/// Directories never treated as part of the mirror.
const SKIP_DIRS: &[&str] = &["__pycache__"];

/// One rewritten source file.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    /// Path relative to both the source root and the mirror root.
    pub relative: PathBuf,
    /// Banner plus rewritten source.
    pub contents: String,
    /// What the rewriter changed.
    pub report: RewriteReport,
    symbols: ModuleSymbols,
}

/// Outcome of a successful emit.
#[derive(Debug, Clone, Default)]
pub struct EmitReport {
    /// Input files rewritten into the mirror.
    pub converted: usize,
    /// Files published, manifest included.
    pub written: usize,
    /// Rule and rename totals over all files.
    pub rules: RewriteReport,
    /// Published mirror directory.
    pub mirror: PathBuf,
}

/// Differences between the published mirror and a fresh rendering.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// Files whose contents differ.
    pub stale: Vec<PathBuf>,
    /// Files that would be created.
    pub missing: Vec<PathBuf>,
    /// Files in the mirror that would be removed.
    pub extra: Vec<PathBuf>,
    /// Unified diffs for stale and missing files, in rendering order.
    pub diffs: Vec<String>,
}

impl CheckReport {
    /// Whether the mirror matches its sources.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.stale.is_empty() && self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Drives the rewriter over a source package.
#[derive(Debug, Clone)]
pub struct Emitter<'t> {
    config: EmitConfig,
    table: &'t RenameTable,
}

impl<'t> Emitter<'t> {
    /// Create an emitter.
    #[must_use]
    pub fn new(config: EmitConfig, table: &'t RenameTable) -> Self {
        Self { config, table }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EmitConfig {
        &self.config
    }

    /// Input files relative to the source root: the fixed modules in
    /// configured order, then resource modules sorted by file name.
    ///
    /// # Errors
    /// `MissingInput` when a fixed module is absent, `Walk` when the
    /// resource directory cannot be listed.
    pub fn inputs(&self) -> Result<Vec<PathBuf>, EmitError> {
        let root = &self.config.source_root;
        let mut inputs = Vec::new();
        for module in &self.config.modules {
            if !root.join(module).is_file() {
                return Err(EmitError::MissingInput(module.clone()));
            }
            inputs.push(PathBuf::from(module));
        }

        let resources = root.join(&self.config.resources_dir);
        if resources.is_dir() {
            for entry in WalkDir::new(&resources)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry?;
                let path = entry.path();
                let matches_extension = path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy() == self.config.extension);
                if entry.file_type().is_file() && matches_extension {
                    inputs.push(Path::new(&self.config.resources_dir).join(entry.file_name()));
                }
            }
        } else {
            tracing::debug!(path = %resources.display(), "no resource directory");
        }
        Ok(inputs)
    }

    /// Rewrite every input and validate the rename tables.
    ///
    /// # Errors
    /// The first read, parse or rewrite failure, or `RenameDrift`.
    pub fn convert(&self) -> Result<Vec<ConvertedFile>, EmitError> {
        let inputs = self.inputs()?;
        tracing::info!(
            root = %self.config.source_root.display(),
            files = inputs.len(),
            "rewriting async sources"
        );

        let rewriter = TreeRewriter::new(self.table);
        let banner = self.config.banner();
        let converted = inputs
            .par_iter()
            .map_init(PythonParser::new, |parser, relative| {
                let parser = parser.as_mut().map_err(|e| EmitError::Parse {
                    path: relative.display().to_string(),
                    source: e.clone(),
                })?;
                self.convert_one(parser, &rewriter, &banner, relative)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let symbols: Vec<ModuleSymbols> = converted.iter().map(|f| f.symbols.clone()).collect();
        check_rename_drift(&symbols, &self.config, self.table)?;
        Ok(converted)
    }

    fn convert_one(
        &self,
        parser: &mut PythonParser,
        rewriter: &TreeRewriter<'_>,
        banner: &str,
        relative: &Path,
    ) -> Result<ConvertedFile, EmitError> {
        let path = relative.display().to_string();
        let source = read_source(
            self.config.source_root.join(relative),
            self.config.max_file_size,
        )?;

        let tree = parser.parse(&source).map_err(|source| EmitError::Parse {
            path: path.clone(),
            source,
        })?;
        let source_symbols = top_level_symbols(&tree);
        let (tree, report) = rewriter
            .rewrite(tree)
            .map_err(|source| EmitError::Rewrite {
                path: path.clone(),
                source,
            })?;
        let output_symbols = top_level_symbols(&tree);

        tracing::debug!(
            file = %path,
            rules = report.total_rules(),
            renamed = report.renamed,
            module_paths = report.module_paths,
            "rewrote file"
        );

        let mut contents = String::with_capacity(banner.len() + source.len());
        contents.push_str(banner);
        contents.push_str(&tree.to_source());

        Ok(ConvertedFile {
            relative: relative.to_path_buf(),
            contents,
            report,
            symbols: ModuleSymbols {
                relative: relative.to_path_buf(),
                source: source_symbols,
                output: output_symbols,
            },
        })
    }

    /// Every file of the mirror with its contents, manifest last.
    ///
    /// # Errors
    /// See [`Emitter::convert`].
    pub fn render(&self) -> Result<Vec<(PathBuf, String)>, EmitError> {
        let mut files: Vec<(PathBuf, String)> = self
            .convert()?
            .into_iter()
            .map(|f| (f.relative, f.contents))
            .collect();
        files.push((
            PathBuf::from(MANIFEST_FILE),
            render_manifest(&self.config, self.table),
        ));
        Ok(files)
    }

    /// Regenerate and publish the mirror.
    ///
    /// The previous mirror stays in place unless every step succeeds. On
    /// success the mirror holds exactly the rendered files; anything else
    /// found there is removed.
    ///
    /// # Errors
    /// Any conversion, validation or filesystem failure.
    pub fn emit(&self) -> Result<EmitReport, EmitError> {
        let converted = self.convert()?;

        let mut rules = RewriteReport::default();
        let mut staged = StagedDir::create(self.config.staging_root())?;
        for file in &converted {
            rules.merge(&file.report);
            staged.write(&file.relative, &file.contents)?;
        }
        staged.write(MANIFEST_FILE, &render_manifest(&self.config, self.table))?;
        let written = staged.file_count();

        let mirror = self.config.mirror_root();
        staged.publish(&mirror)?;

        for (rule, count) in &rules.applied {
            tracing::debug!(rule = %rule, count, "rule applications");
        }
        tracing::info!(
            mirror = %mirror.display(),
            renamed = rules.renamed,
            "converted {} files",
            converted.len()
        );

        Ok(EmitReport {
            converted: converted.len(),
            written,
            rules,
            mirror,
        })
    }

    /// Compare the published mirror with a fresh rendering without writing.
    ///
    /// # Errors
    /// Any conversion or validation failure.
    pub fn check(&self) -> Result<CheckReport, EmitError> {
        let expected = self.render()?;
        let mirror = self.config.mirror_root();
        let mut report = CheckReport::default();

        for (relative, contents) in &expected {
            let path = mirror.join(relative);
            let name = relative.display().to_string();
            if !path.is_file() {
                report.diffs.push(generate_unified_diff(&name, "", contents));
                report.missing.push(relative.clone());
                continue;
            }
            let current = read_source(&path, u64::MAX)?;
            if current != *contents {
                report.diffs.push(generate_unified_diff(&name, &current, contents));
                report.stale.push(relative.clone());
            }
        }

        let known: BTreeSet<&Path> = expected.iter().map(|(p, _)| p.as_path()).collect();
        report.extra = mirror_files(&mirror)?
            .into_iter()
            .filter(|p| !known.contains(p.as_path()))
            .collect();

        tracing::info!(
            stale = report.stale.len(),
            missing = report.missing.len(),
            extra = report.extra.len(),
            "checked mirror"
        );
        Ok(report)
    }
}

/// Files currently in the mirror, relative to it, skipping cache directories.
fn mirror_files(mirror: &Path) -> Result<Vec<PathBuf>, EmitError> {
    if !mirror.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    let walker = WalkDir::new(mirror)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !SKIP_DIRS.iter().any(|d| e.file_name() == *d));
    for entry in walker {
        let entry = entry?;
        // Every file counts: publishing would remove it
        if entry.file_type().is_file() {
            if let Ok(relative) = entry.path().strip_prefix(mirror) {
                files.push(relative.to_path_buf());
            }
        }
    }
    Ok(files)
}
