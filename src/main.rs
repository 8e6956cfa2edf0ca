use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use walkdir::WalkDir;

use exportscope::analysis::ExportAnalyzer;
use exportscope::parser::SourceLanguage;
use exportscope::report::{report, ReportFormat};
use exportscope::resolve;

/// Package directories that hold no analyzable entry points.
const IGNORED_PACKAGE_DIRS: &[&str] = &[".bin", "@types"];

/// Directories skipped when walking a source tree.
const IGNORED_TREE_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".next",
    "coverage",
    ".turbo",
];

#[derive(Parser)]
#[command(name = "exportscope")]
#[command(version = "0.1.0")]
#[command(
    about = "Static export-surface analyzer for JavaScript and TypeScript modules",
    long_about = None
)]
struct Cli {
    /// File or directory to analyze (defaults to the current directory)
    path: Option<PathBuf>,

    /// Analyze the entry point of every package under ./node_modules instead
    #[arg(long)]
    node_modules: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: ReportFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut analyzer = ExportAnalyzer::new().context("failed to initialize parsers")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.node_modules {
        return analyze_node_modules(&mut analyzer, cli.format, &mut out);
    }

    let path = match cli.path {
        Some(path) => path,
        None => env::current_dir().context("failed to determine current directory")?,
    };
    if path.is_file() {
        analyze_one(&mut analyzer, &path, cli.format, &mut out, true)?;
    } else if path.is_dir() {
        analyze_tree(&mut analyzer, &path, cli.format, &mut out)?;
    } else {
        bail!("no such file or directory: {}", path.display());
    }
    Ok(())
}

/// Analyze one file. With `fatal` set, failure aborts; otherwise it is
/// reported to stderr and skipped, so one broken file cannot sink a batch.
fn analyze_one<W: Write>(
    analyzer: &mut ExportAnalyzer,
    path: &Path,
    format: ReportFormat,
    out: &mut W,
    fatal: bool,
) -> Result<()> {
    match analyzer.analyze_file(path) {
        Ok(exports) => {
            report(&exports, &path.display().to_string(), format, out)?;
        }
        Err(error) if fatal => {
            return Err(error).with_context(|| format!("failed to analyze {}", path.display()));
        }
        Err(error) => {
            eprintln!("warning: skipping {}: {}", path.display(), error);
        }
    }
    Ok(())
}

/// Walk a source tree and analyze every JavaScript/TypeScript file in it.
fn analyze_tree<W: Write>(
    analyzer: &mut ExportAnalyzer,
    root: &Path,
    format: ReportFormat,
    out: &mut W,
) -> Result<()> {
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_ignored_dir(entry.path()));
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if SourceLanguage::from_path(entry.path()).is_none() {
            continue;
        }
        analyze_one(analyzer, entry.path(), format, out, false)?;
    }
    Ok(())
}

/// Resolve and analyze the entry point of every installed package under the
/// current directory's node_modules.
fn analyze_node_modules<W: Write>(
    analyzer: &mut ExportAnalyzer,
    format: ReportFormat,
    out: &mut W,
) -> Result<()> {
    let cwd = env::current_dir().context("failed to determine current directory")?;
    let modules_dir = cwd.join("node_modules");
    let entries = fs::read_dir(&modules_dir)
        .with_context(|| format!("failed to read {}", modules_dir.display()))?;

    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if IGNORED_PACKAGE_DIRS.contains(&name.as_str()) {
            continue;
        }
        if name.starts_with('@') {
            // scoped packages live one level deeper
            for scoped in fs::read_dir(entry.path())? {
                let scoped = scoped?;
                names.push(format!("{}/{}", name, scoped.file_name().to_string_lossy()));
            }
        } else {
            names.push(name);
        }
    }
    names.sort();

    for name in names {
        let Some(entry_point) = resolve::resolve_import(&name, &cwd) else {
            eprintln!("warning: could not resolve entry point of {}", name);
            continue;
        };
        // packages whose entry point is not analyzable source (data files,
        // native addons) are skipped
        if SourceLanguage::from_path(&entry_point).is_none() {
            continue;
        }
        analyze_one(analyzer, &entry_point, format, out, false)?;
    }
    Ok(())
}

fn is_ignored_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| IGNORED_TREE_DIRS.contains(&name))
}
