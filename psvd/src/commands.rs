use crate::{
    catalog::SqliteCatalog,
    config::{self, Installation, SOURCE_ENV},
    export::Exporter,
    logger::Logger,
};
use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use colored::Colorize;
use log::{LevelFilter, error, info, warn};
use std::{
    io::{IsTerminal, stderr},
    path::{Path, PathBuf},
    process,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Instant,
};

/// Export downloaded courses from the offline psv viewer to plain video,
/// subtitle and metadata files.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    /// Viewer install directory holding the catalog database and the courses directory.
    /// By default the viewer's directory under the local data directory is used.
    #[arg(long, env = SOURCE_ENV, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Directory to export courses into.
    /// By default an output directory next to the executable is used.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Number of worker threads used for exporting.
    /// Number of threads should be in range 1-64 (inclusive).
    /// By default one thread per available core is used.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=64))]
    pub threads: Option<u8>,

    /// Start exporting without asking for confirmation.
    #[arg(short = 'y', long)]
    pub skip_prompt: bool,

    /// Print debug messages.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// When to output colored text.
    #[arg(long, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,
}

impl Args {
    pub fn colored(&self) -> bool {
        match self.color {
            ColorChoice::Always => true,
            ColorChoice::Auto => stderr().is_terminal(),
            ColorChoice::Never => false,
        }
    }

    fn level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }

    pub fn execute(self) -> Result<()> {
        Logger::init(self.level())?;

        let install = Installation::discover(self.source.clone())?;
        let output = self.output.clone().unwrap_or_else(config::default_output_dir);

        info!("Source: {}", install.root.display().to_string().cyan());
        info!("Courses: {}", install.courses.display().to_string().cyan());
        info!("Output: {}", output.display().to_string().cyan());
        info!("Found {} downloaded courses:", install.course_dirs.len());

        for dir in &install.course_dirs {
            if let Some(name) = dir.file_name() {
                info!("  {}", name.to_string_lossy());
            }
        }

        if !self.skip_prompt && !confirm()? {
            info!("Nothing exported.");
            return Ok(());
        }

        let catalog = SqliteCatalog::open(&install.catalog)
            .with_context(|| format!("cannot open catalog {}", install.catalog.display()))?;
        let cancel = Arc::new(AtomicBool::new(false));
        let handler_cancel = cancel.clone();

        ctrlc::set_handler(move || {
            if handler_cancel.swap(true, Ordering::SeqCst) {
                process::exit(130);
            }

            eprintln!(
                "{} finishing running units, press Ctrl+C again to quit now",
                "Interrupted".bold().yellow()
            );
        })?;

        let threads = self
            .threads
            .map(usize::from)
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, |x| x.get()));
        let started = Instant::now();
        let report = Exporter::new(catalog, install.courses.clone(), output.clone())
            .threads(threads)
            .cancel_flag(cancel)
            .progress(!self.quiet && stderr().is_terminal())
            .run()?;

        info!(
            "Finished in {:.1}s: {}.",
            started.elapsed().as_secs_f64(),
            report
        );

        if !report.warnings.is_empty() {
            warn!("{} items were skipped, see the warnings above.", report.warnings.len());
        }

        for failure in &report.failures {
            error!("{failure}");
        }

        if report.failed() > 0 {
            error!("{} units failed.", report.failed());
        }

        open_in_explorer(&output);
        Ok(())
    }
}

#[cfg(windows)]
fn open_in_explorer(path: &Path) {
    if let Err(e) = process::Command::new("explorer").arg(path).spawn() {
        warn!("Cannot open {}: {e}", path.display());
    }
}

#[cfg(not(windows))]
fn open_in_explorer(_: &Path) {}

fn confirm() -> Result<bool> {
    let question = requestty::Question::confirm("start")
        .message("Start exporting?")
        .default(true)
        .build();

    Ok(requestty::prompt_one(question)?.as_bool().unwrap_or(false))
}
