//! Walks the catalog and exports every downloaded course.
//!
//! Scheduling happens on the calling thread, which is the only one that touches
//! the catalog. Output directories are created there too, before any unit that
//! writes into them is handed to the worker pool. Units never wait on each other;
//! the run ends once every scheduled unit has reported back.

mod error;
mod report;
mod unit;

pub use error::{ExportError, UnitError};
pub use report::{Report, UnitFailure};
pub use unit::{Outcome, Unit, UnitKind};

use crate::{
    catalog::{Catalog, Clip, Course, Module},
    naming,
};
use kdam::BarExt;
use log::{debug, info};
use psvd_media::text::Cue;
use rayon::{ThreadPool, ThreadPoolBuilder};
use report::Completion;
use std::{
    any::Any,
    fs,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Sender},
    },
    thread,
};

pub const IMAGE_FILE: &str = "image.jpg";
pub const COURSE_INFO_FILE: &str = "course-info.json";
pub const MODULE_INFO_FILE: &str = "module-info.json";
pub const CLIP_INFO_FILE: &str = "clip-info.json";

pub struct Exporter<C> {
    catalog: C,
    courses_dir: PathBuf,
    output_dir: PathBuf,
    threads: usize,
    cancel: Arc<AtomicBool>,
    progress: bool,
}

impl<C: Catalog> Exporter<C> {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(catalog: C, courses_dir: P, output_dir: Q) -> Self {
        Self {
            catalog,
            courses_dir: courses_dir.into(),
            output_dir: output_dir.into(),
            threads: thread::available_parallelism().map_or(1, |x| x.get()),
            cancel: Arc::new(AtomicBool::new(false)),
            progress: false,
        }
    }

    /// Worker pool size, at least one.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Units that have not started once `cancel` is set resolve as cancelled.
    pub fn cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Draw a progress bar on stderr while draining.
    pub fn progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Schedule every unit for every downloaded course and wait for all of them.
    ///
    /// Only a failure to list courses or to start at all is returned as an error,
    /// everything else ends up in the [`Report`].
    pub fn run(&self) -> Result<Report, ExportError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::Output {
            path: self.output_dir.clone(),
            source,
        })?;

        let courses = self.catalog.courses()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("psvd-worker-{i}"))
            .build()?;
        let (tx, rx) = mpsc::channel();
        let mut scheduler = Scheduler {
            cancel: self.cancel.clone(),
            pool: &pool,
            report: Report::default(),
            tx,
        };

        debug!("Found {} courses in catalog.", courses.len());

        for course in courses {
            self.schedule_course(&mut scheduler, course);
        }

        let Scheduler { mut report, tx, .. } = scheduler;
        drop(tx);

        let mut pb = kdam::tqdm!(
            total = report.scheduled,
            desc = "Exporting".to_owned(),
            unit = " units".to_owned(),
            dynamic_ncols = true,
            disable = !self.progress
        );

        // Ends once every worker has dropped its sender.
        for completion in rx {
            report.record(completion);
            let _ = pb.update(1);
        }

        if self.progress {
            eprintln!();
        }

        Ok(report)
    }

    fn schedule_course(&self, s: &mut Scheduler<'_>, course: Course) {
        let source = self.courses_dir.join(&course.name);

        if !source.is_dir() {
            debug!("Course {} not found in {}.", course.name, source.display());
            s.report.warn(format!(
                "Course {} ({}) is not downloaded, skipping.",
                course.title, course.name
            ));
            return;
        }

        let output = self.output_dir.join(naming::course_dir_name(&course));

        if !s.create_dir(&output) {
            return;
        }

        info!("Exporting course {}.", course.title);
        s.dispatch(Unit::CopyImage {
            source: source.join(IMAGE_FILE),
            target: output.join(IMAGE_FILE),
        });

        let modules = self.catalog.modules(&course.name);
        s.dispatch(Unit::CourseInfo {
            course,
            target: output.join(COURSE_INFO_FILE),
        });

        match modules {
            Ok(modules) => {
                for module in modules {
                    self.schedule_module(s, &source, &output, module);
                }
            }
            Err(e) => s.report.fail(UnitKind::ReadCatalog, output, e.into()),
        }
    }

    fn schedule_module(&self, s: &mut Scheduler<'_>, course_source: &Path, course_output: &Path, module: Module) {
        let source = course_source.join(naming::module_hash(&module.name, &module.author_handle));

        if !source.is_dir() {
            s.report.warn(format!(
                "Module {} source directory {} not found, skipping.",
                module.title,
                source.display()
            ));
            return;
        }

        let output = course_output.join(naming::entry_name(
            module.module_index,
            &module.title,
            &module.name,
        ));

        if !s.create_dir(&output) {
            return;
        }

        let clips = self.catalog.clips(module.id);
        let title = module.title.clone();
        s.dispatch(Unit::ModuleInfo {
            module,
            target: output.join(MODULE_INFO_FILE),
        });

        let clips = match clips {
            Ok(clips) if clips.is_empty() => {
                s.report.warn(format!("Module {title} has no clips, skipping."));
                return;
            }
            Ok(clips) => clips,
            Err(e) => {
                s.report.fail(UnitKind::ReadCatalog, output, e.into());
                return;
            }
        };

        for clip in &clips {
            self.schedule_clip(s, &source, &output, clip);
        }

        s.dispatch(Unit::ClipInfo {
            clips,
            target: output.join(CLIP_INFO_FILE),
        });
    }

    fn schedule_clip(&self, s: &mut Scheduler<'_>, module_source: &Path, module_output: &Path, clip: &Clip) {
        let name = naming::entry_name(clip.clip_index, &clip.title, &clip.name);

        s.dispatch(Unit::DecryptClip {
            source: module_source.join(format!("{}.psv", clip.name)),
            target: module_output.join(format!("{name}.mp4")),
        });

        let target = module_output.join(format!("{name}.srt"));

        match self.catalog.transcripts(clip.id) {
            Ok(lines) if lines.is_empty() => debug!("Clip {} has no transcript.", clip.name),
            Ok(lines) => s.dispatch(Unit::Subtitles {
                subtitles: lines.into_iter().map(Cue::from).collect(),
                target,
            }),
            Err(e) => s.report.fail(UnitKind::ReadCatalog, target, e.into()),
        }
    }
}

struct Scheduler<'a> {
    cancel: Arc<AtomicBool>,
    pool: &'a ThreadPool,
    report: Report,
    tx: Sender<Completion>,
}

impl Scheduler<'_> {
    fn dispatch(&mut self, unit: Unit) {
        let cancel = self.cancel.clone();
        let tx = self.tx.clone();
        self.report.scheduled += 1;

        self.pool.spawn(move || {
            let result = if cancel.load(Ordering::SeqCst) {
                Ok(Outcome::Cancelled)
            } else {
                guarded(|| unit.execute())
            };

            // The receiver lives until every sender is gone.
            let _ = tx.send(Completion {
                kind: unit.kind(),
                target: unit.target().to_path_buf(),
                result,
            });
        });
    }

    fn create_dir(&mut self, path: &Path) -> bool {
        match fs::create_dir_all(path) {
            Ok(()) => true,
            Err(e) => {
                let error = UnitError::io("create", path)(e);
                self.report
                    .fail(UnitKind::CreateDirectory, path.to_path_buf(), error);
                false
            }
        }
    }
}

/// Run a unit, turning a panic into a failure of that unit alone.
fn guarded<F: FnOnce() -> Result<Outcome, UnitError>>(f: F) -> Result<Outcome, UnitError> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(UnitError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(x) = payload.downcast_ref::<&str>() {
        (*x).to_owned()
    } else if let Some(x) = payload.downcast_ref::<String>() {
        x.clone()
    } else {
        "unknown panic".to_owned()
    }
}
