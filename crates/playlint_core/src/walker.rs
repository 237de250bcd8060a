//! Lazy, parallel project walker using the `ignore` crate.
//!
//! Each call to [`ProjectWalker::walk`] starts a fresh traversal on a
//! background thread. `ignore`'s parallel visitors read files and push
//! [`WalkItem`]s into a bounded crossbeam channel; the returned
//! [`WalkStream`] drains it. A full channel blocks the visitors, so memory
//! stays bounded no matter how large the tree is.
//!
//! Symbolic links are followed by default. Loops are reported by `ignore`
//! as errors and surface here as [`WalkItem::Cycle`] instead of recursing.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, ParallelVisitor, ParallelVisitorBuilder, WalkBuilder, WalkState};
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::error::CheckerError;
use crate::finding::{Finding, Severity};

/// Files larger than this are skipped (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default capacity of the walker channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Rule id of findings reporting a symlink cycle.
pub const SYMLINK_CYCLE: &str = "symlink-cycle";

/// Rule id of findings reporting a file that was deliberately not checked.
pub const FILE_SKIPPED: &str = "file-skipped";

/// Rule id of findings reporting a file that could not be read.
pub const FILE_READ_ERROR: &str = "file-read-error";

/// Configuration for project walking.
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Whether to respect `.gitignore` files.
    /// Default: true
    pub respect_gitignore: bool,
    /// Whether to include hidden files (files starting with `.`).
    /// Default: false (excludes hidden files)
    pub include_hidden: bool,
    /// Number of threads to use for parallel walking.
    /// Default: 0 (uses all available CPUs)
    pub threads: usize,
    /// Whether to follow symbolic links.
    /// Default: true
    pub follow_links: bool,
    /// Maximum directory depth to traverse.
    /// Default: None (no limit)
    pub max_depth: Option<usize>,
    /// Glob patterns to include, matched against root-relative paths.
    pub include_patterns: Vec<String>,
    /// Glob patterns to exclude. Exclusion wins over inclusion.
    pub exclude_patterns: Vec<String>,
    /// Capacity of the channel between walker threads and the consumer.
    /// Default: 1024
    pub channel_capacity: usize,
    /// Files larger than this many bytes are skipped.
    /// Default: 10 MiB
    pub max_file_size: u64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            include_hidden: false,
            threads: 0,
            follow_links: true,
            max_depth: None,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl WalkConfig {
    /// Creates a new `WalkConfig` with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables `.gitignore` support.
    pub fn respect_gitignore(mut self, yes: bool) -> Self {
        self.respect_gitignore = yes;
        self
    }

    /// Enables or disables hidden file inclusion.
    pub fn include_hidden(mut self, yes: bool) -> Self {
        self.include_hidden = yes;
        self
    }

    /// Sets the number of threads for parallel walking.
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    /// Sets whether to follow symbolic links.
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }

    /// Sets the maximum directory depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Adds an include glob pattern.
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Adds an exclude glob pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Sets the channel capacity. Zero is bumped to one.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Sets the maximum size of a checked file, in bytes.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }
}

/// A readable UTF-8 file produced by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFile {
    /// Path as discovered on disk.
    pub path: PathBuf,
    /// Path relative to the walk root, `/`-separated.
    pub relative_path: String,
    /// File contents.
    pub contents: String,
}

/// One item of a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkItem {
    /// A file ready to be checked.
    File(ProjectFile),
    /// A symbolic link leading back to one of its ancestors.
    Cycle { path: String, ancestor: String },
    /// A file or directory that was not checked.
    Unreadable {
        path: String,
        reason: String,
        severity: Severity,
    },
}

impl WalkItem {
    /// Root-relative path of the item.
    pub fn path(&self) -> &str {
        match self {
            WalkItem::File(file) => &file.relative_path,
            WalkItem::Cycle { path, .. } | WalkItem::Unreadable { path, .. } => path,
        }
    }

    /// Converts a non-file item into the finding that reports it.
    pub fn to_finding(&self) -> Option<Finding> {
        match self {
            WalkItem::File(_) => None,
            WalkItem::Cycle { path, ancestor } => Some(Finding::new(
                SYMLINK_CYCLE,
                path.as_str(),
                Severity::Info,
                format!("symbolic link cycle back to '{}' was not followed", display_root(ancestor)),
            )),
            WalkItem::Unreadable {
                path,
                reason,
                severity,
            } => {
                let rule_id = if *severity == Severity::Info {
                    FILE_SKIPPED
                } else {
                    FILE_READ_ERROR
                };
                Some(Finding::new(rule_id, path.as_str(), *severity, reason.as_str()))
            }
        }
    }
}

fn display_root(path: &str) -> &str {
    if path.is_empty() { "." } else { path }
}

/// Counters shared by the walker threads of one walk.
#[derive(Debug, Default)]
pub struct WalkStats {
    files: AtomicUsize,
    skipped: AtomicUsize,
    cycles: AtomicUsize,
    errors: AtomicUsize,
    interrupted: AtomicBool,
}

impl WalkStats {
    pub fn files(&self) -> usize {
        self.files.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn cycles(&self) -> usize {
        self.cycles.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    /// True if the walk stopped early because of cancellation.
    pub fn interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Relaxed)
    }

    fn mark_interrupted(&self) {
        self.interrupted.store(true, Ordering::Relaxed);
    }

    fn record(&self, item: &WalkItem) {
        let counter = match item {
            WalkItem::File(_) => &self.files,
            WalkItem::Cycle { .. } => &self.cycles,
            WalkItem::Unreadable { .. } => &self.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Walks one project root.
#[derive(Debug, Clone)]
pub struct ProjectWalker {
    root: PathBuf,
    config: WalkConfig,
    filter: Arc<GlobFilter>,
}

impl ProjectWalker {
    /// Creates a walker for `root`.
    ///
    /// Fails if the root is not an existing directory or if an
    /// include/exclude pattern is invalid.
    pub fn new(root: impl Into<PathBuf>, config: WalkConfig) -> Result<Self, CheckerError> {
        let root = root.into();
        if !root.exists() {
            return Err(CheckerError::config(format!(
                "root '{}' does not exist",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(CheckerError::config(format!(
                "root '{}' is not a directory",
                root.display()
            )));
        }

        let filter = GlobFilter::new(&config.include_patterns, &config.exclude_patterns)?;
        Ok(Self {
            root,
            config,
            filter: Arc::new(filter),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Starts a fresh traversal.
    ///
    /// The traversal stops early once `cancel` is raised.
    pub fn walk(&self, cancel: &CancelToken) -> WalkStream {
        let (tx, rx) = crossbeam_channel::bounded::<WalkItem>(self.config.channel_capacity.max(1));
        let stats = Arc::new(WalkStats::default());

        let context = Arc::new(WalkContext {
            root: self.root.clone(),
            filter: Arc::clone(&self.filter),
            max_file_size: self.config.max_file_size,
            cancel: cancel.clone(),
            stats: Arc::clone(&stats),
            reported_cycles: Mutex::new(HashSet::new()),
        });
        let root = self.root.clone();
        let config = self.config.clone();

        let producer = thread::spawn(move || {
            let mut visitor_builder = ItemVisitorBuilder {
                tx,
                context: Arc::clone(&context),
            };
            walk_builder(&root, &config)
                .build_parallel()
                .visit(&mut visitor_builder);

            // Closes the channel
            drop(visitor_builder);

            let stats = &context.stats;
            info!(
                "Walker: discovered {} files ({} skipped, {} cycles, {} errors)",
                stats.files(),
                stats.skipped(),
                stats.cycles(),
                stats.errors()
            );
        });

        WalkStream {
            rx: Some(rx),
            producer: Some(producer),
            cancel: cancel.clone(),
            stats,
        }
    }
}

fn walk_builder(root: &Path, config: &WalkConfig) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .require_git(false)
        .hidden(!config.include_hidden)
        .follow_links(config.follow_links)
        .threads(config.threads)
        .max_depth(config.max_depth);
    builder
}

/// Lazy stream of walk items.
///
/// Dropping the stream stops the walk and joins the walker thread.
pub struct WalkStream {
    rx: Option<Receiver<WalkItem>>,
    producer: Option<thread::JoinHandle<()>>,
    cancel: CancelToken,
    stats: Arc<WalkStats>,
}

impl WalkStream {
    /// Counters of this walk, updated while it runs.
    pub fn stats(&self) -> Arc<WalkStats> {
        Arc::clone(&self.stats)
    }
}

impl Iterator for WalkStream {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        if self.cancel.is_cancelled() {
            if self.rx.take().is_some() {
                debug!("Walk cancelled; no further items are handed out");
                self.stats.mark_interrupted();
            }
            return None;
        }
        self.rx.as_ref()?.recv().ok()
    }
}

impl Drop for WalkStream {
    fn drop(&mut self) {
        // Disconnect first so blocked visitors see a send error and quit.
        self.rx.take();
        if let Some(producer) = self.producer.take()
            && producer.join().is_err()
        {
            warn!("Walker thread panicked");
        }
    }
}

/// State shared by the visitors of one walk.
struct WalkContext {
    root: PathBuf,
    filter: Arc<GlobFilter>,
    max_file_size: u64,
    cancel: CancelToken,
    stats: Arc<WalkStats>,
    /// Canonical member directories of every cycle reported so far.
    reported_cycles: Mutex<HashSet<BTreeSet<PathBuf>>>,
}

impl WalkContext {
    fn relative(&self, path: &Path) -> String {
        relative_path(&self.root, path)
    }

    fn read(&self, path: &Path, relative_path: String) -> WalkItem {
        match fs::metadata(path) {
            Ok(meta) if meta.len() > self.max_file_size => {
                let reason = format!(
                    "file is {} bytes, larger than the {} byte limit",
                    meta.len(),
                    self.max_file_size
                );
                return unreadable(relative_path, reason, Severity::Info);
            }
            Ok(_) => {}
            Err(e) => {
                let reason = format!("failed to read file: {}", e);
                return unreadable(relative_path, reason, Severity::Warning);
            }
        }

        match fs::read(path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(contents) => WalkItem::File(ProjectFile {
                    path: path.to_path_buf(),
                    relative_path,
                    contents,
                }),
                Err(_) => unreadable(relative_path, "file is not valid UTF-8", Severity::Info),
            },
            Err(e) => {
                let reason = format!("failed to read file: {}", e);
                unreadable(relative_path, reason, Severity::Warning)
            }
        }
    }

    /// Returns true the first time a loop through these directories is seen.
    ///
    /// A cycle is entered from each of its members, so `a -> b -> a` is
    /// detected once below `a` and once below `b`.
    fn first_report_of_cycle(&self, child: &Path, ancestor: &Path) -> bool {
        let members = cycle_members(child, ancestor);
        let mut reported = self
            .reported_cycles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        reported.insert(members)
    }

    fn classify_error(&self, err: &ignore::Error) -> Option<WalkItem> {
        if let Some((child, ancestor)) = find_loop(err) {
            return Some(WalkItem::Cycle {
                path: self.relative(child),
                ancestor: self.relative(ancestor),
            });
        }
        let path = error_path(err)?;
        Some(WalkItem::Unreadable {
            path: self.relative(path),
            reason: err.to_string(),
            severity: Severity::Warning,
        })
    }
}

fn unreadable(path: String, reason: impl Into<String>, severity: Severity) -> WalkItem {
    WalkItem::Unreadable {
        path,
        reason: reason.into(),
        severity,
    }
}

/// Visitor builder for parallel walking.
struct ItemVisitorBuilder {
    tx: Sender<WalkItem>,
    context: Arc<WalkContext>,
}

impl<'s> ParallelVisitorBuilder<'s> for ItemVisitorBuilder {
    fn build(&mut self) -> Box<dyn ParallelVisitor + 's> {
        Box::new(ItemVisitor {
            tx: self.tx.clone(),
            context: Arc::clone(&self.context),
        })
    }
}

/// Per-thread visitor for parallel walking.
struct ItemVisitor {
    tx: Sender<WalkItem>,
    context: Arc<WalkContext>,
}

impl ParallelVisitor for ItemVisitor {
    fn visit(&mut self, entry: Result<DirEntry, ignore::Error>) -> WalkState {
        let context = &self.context;
        if context.cancel.is_cancelled() {
            context.stats.mark_interrupted();
            return WalkState::Quit;
        }

        let item = match entry {
            Ok(dir_entry) => {
                if !dir_entry.file_type().is_some_and(|ft| ft.is_file()) {
                    return WalkState::Continue;
                }
                let relative_path = context.relative(dir_entry.path());
                if !context.filter.should_include(&relative_path) {
                    return WalkState::Continue;
                }
                debug!("Discovered {}", relative_path);
                context.read(dir_entry.path(), relative_path)
            }
            Err(err) => match context.classify_error(&err) {
                Some(item) => {
                    if context.filter.is_excluded(item.path()) {
                        return WalkState::Continue;
                    }
                    if let Some((child, ancestor)) = find_loop(&err)
                        && !context.first_report_of_cycle(child, ancestor)
                    {
                        debug!("Cycle at {} already reported", item.path());
                        return WalkState::Continue;
                    }
                    item
                }
                None => {
                    context.stats.errors.fetch_add(1, Ordering::Relaxed);
                    warn!("Walk error: {}", err);
                    return WalkState::Continue;
                }
            },
        };

        context.stats.record(&item);
        if self.tx.send(item).is_err() {
            return WalkState::Quit;
        }
        WalkState::Continue
    }
}

/// Finds a symlink loop inside a (possibly wrapped) walk error.
fn find_loop(err: &ignore::Error) -> Option<(&Path, &Path)> {
    match err {
        ignore::Error::Loop { ancestor, child } => Some((child.as_path(), ancestor.as_path())),
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => find_loop(err),
        ignore::Error::Partial(errs) => errs.iter().find_map(find_loop),
        _ => None,
    }
}

/// Canonical directories a loop passes through, from `ancestor` down to
/// the link that leads back to it.
fn cycle_members(child: &Path, ancestor: &Path) -> BTreeSet<PathBuf> {
    let canonical = |dir: &Path| fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());

    if !child.starts_with(ancestor) {
        return BTreeSet::from([canonical(ancestor)]);
    }
    child
        .ancestors()
        .skip(1)
        .take_while(|dir| dir.starts_with(ancestor))
        .map(canonical)
        .collect()
}

/// Finds the path a (possibly wrapped) walk error refers to.
fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}

/// Renders `path` relative to `root` with `/` separators.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Include/exclude filter over root-relative paths.
#[derive(Debug)]
struct GlobFilter {
    include_set: Option<GlobSet>,
    exclude_set: Option<GlobSet>,
}

impl GlobFilter {
    fn new(include_patterns: &[String], exclude_patterns: &[String]) -> Result<Self, CheckerError> {
        Ok(Self {
            include_set: Self::build_globset(include_patterns, "include")?,
            exclude_set: Self::build_globset(exclude_patterns, "exclude")?,
        })
    }

    /// Builds a GlobSet from a list of patterns.
    ///
    /// Returns `None` if the pattern list is empty.
    fn build_globset(patterns: &[String], name: &str) -> Result<Option<GlobSet>, CheckerError> {
        if patterns.is_empty() {
            return Ok(None);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                CheckerError::config(format!("invalid {} pattern '{}': {}", name, pattern, e.kind()))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map(Some)
            .map_err(|e| CheckerError::config(format!("failed to build {} patterns: {}", name, e)))
    }

    fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclude_set
            .as_ref()
            .is_some_and(|exclude| exclude.is_match(relative_path))
    }

    fn should_include(&self, relative_path: &str) -> bool {
        if self.is_excluded(relative_path) {
            return false;
        }

        self.include_set
            .as_ref()
            .is_none_or(|include| include.is_match(relative_path))
    }
}
