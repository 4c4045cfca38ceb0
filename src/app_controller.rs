use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::curation::{CurationStatus, CurationTask, ReportCollector};
use crate::file_utils::FileManager;
use crate::host::{DSpaceObject, Item};
use crate::host::memory::MemoryRepository;
use crate::tasks::{self, HostServices, TaskKind};

// @module: Application controller driving curation tasks over item records

/// Outcome counts of one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub unset: usize,
    /// Records written back
    pub saved: usize,
    /// Records that could not be loaded or saved
    pub unreadable: usize,
}

impl RunSummary {
    fn record(&mut self, status: CurationStatus) {
        self.processed += 1;
        match status {
            CurationStatus::Success => self.succeeded += 1,
            CurationStatus::Skip => self.skipped += 1,
            CurationStatus::Error => self.failed += 1,
            CurationStatus::Unset => self.unset += 1,
        }
    }
}

/// Main application controller: one in-memory host, one task per run
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Host backing the loaded items
    repository: Arc<MemoryRepository>,
    // @field: Receives every report and result
    collector: Arc<ReportCollector>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self {
            config,
            repository: Arc::new(MemoryRepository::new()),
            collector: Arc::new(ReportCollector::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn repository(&self) -> Arc<MemoryRepository> {
        Arc::clone(&self.repository)
    }

    pub fn collector(&self) -> Arc<ReportCollector> {
        Arc::clone(&self.collector)
    }

    /// Host collaborators backed by this controller's repository
    pub fn services(&self) -> HostServices {
        HostServices::from_repository(self.repository())
    }

    // @creates: The configured task, construction reports included
    pub fn build_task(&self, kind: TaskKind) -> Result<Box<dyn CurationTask>> {
        self.config
            .validate_for(kind)
            .with_context(|| format!("Invalid configuration for {} task", kind))?;
        let task = tasks::create_task(kind, &self.config, &self.services(), &*self.collector)
            .with_context(|| format!("Failed to create {} task", kind))?;
        Ok(task)
    }

    /// Run one task over an item record file or a directory of them
    pub async fn run(&self, kind: TaskKind, input_path: &Path, dry_run: bool) -> Result<RunSummary> {
        let mut task = self.build_task(kind)?;
        let save = kind.modifies_items() && !dry_run;
        self.run_with_task(task.as_mut(), input_path, save).await
    }

    /// Run an already built task; records are written back when `save` is set
    pub async fn run_with_task(&self, task: &mut dyn CurationTask, input_path: &Path, save: bool) -> Result<RunSummary> {
        let start_time = Instant::now();
        self.print_reports(None);

        let summary = if FileManager::file_exists(input_path) {
            let mut summary = RunSummary::default();
            let status = self.curate_file(task, input_path, save, None, &mut summary).await?;
            summary.record(status);
            summary
        } else if FileManager::dir_exists(input_path) {
            self.curate_folder(task, input_path, save).await?
        } else {
            return Err(anyhow!("Input path does not exist: {:?}", input_path));
        };

        info!(
            "{}: {} item(s) in {:.1}s ({} success, {} skipped, {} error, {} unset)",
            task.task_id(),
            summary.processed,
            start_time.elapsed().as_secs_f64(),
            summary.succeeded,
            summary.skipped,
            summary.failed,
            summary.unset
        );
        Ok(summary)
    }

    async fn curate_folder(&self, task: &mut dyn CurationTask, input_dir: &Path, save: bool) -> Result<RunSummary> {
        let records: Vec<PathBuf> = FileManager::find_files(input_dir, "json")?;
        let mut summary = RunSummary::default();

        if records.is_empty() {
            warn!("No item records found in {:?}", input_dir);
            return Ok(summary);
        }

        let progress_bar = ProgressBar::new(records.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} items ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        for path in &records {
            progress_bar.set_message(path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default());

            match self.curate_file(task, path, save, Some(&progress_bar), &mut summary).await {
                Ok(status) => summary.record(status),
                Err(e) => {
                    error!("Error processing {:?}: {:#}", path, e);
                    summary.unreadable += 1;
                }
            }
            progress_bar.inc(1);
        }

        progress_bar.finish_with_message("Folder processing complete");
        Ok(summary)
    }

    async fn curate_file(
        &self,
        task: &mut dyn CurationTask,
        path: &Path,
        save: bool,
        progress_bar: Option<&ProgressBar>,
        summary: &mut RunSummary,
    ) -> Result<CurationStatus> {
        let mut item = self.repository.load_item(path)?;
        debug!("Running {} on {}", task.task_id(), path.display());

        // Earlier records' results were already printed with their reports
        self.collector.drain_results();
        let status = task.perform(DSpaceObject::Item(&mut item), &*self.collector).await;
        debug!("{} on {}: {} ({})", task.task_id(), item.handle(), status, status.code());
        self.print_reports(progress_bar);

        if save {
            match self.repository.save_item(&item, path) {
                Ok(()) => summary.saved += 1,
                Err(e) => {
                    error!("Could not save {:?}: {:#}", path, e);
                    summary.unreadable += 1;
                }
            }
        }

        self.repository.release_item(&item);
        Ok(status)
    }

    // @prints: Pending report text, above the progress bar when there is one
    fn print_reports(&self, progress_bar: Option<&ProgressBar>) {
        for text in self.collector.drain_reports() {
            let text = text.trim_end();
            if text.is_empty() {
                continue;
            }
            match progress_bar {
                Some(pb) => pb.suspend(|| println!("{}", text)),
                None => println!("{}", text),
            }
        }
    }
}
