//! File watcher: prints the report on startup, then re-runs it on changes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands::{self, ReportRequest};
use crate::diagnostics;
use crate::error;

/// Debounce delay between filesystem events and the next report.
const DEBOUNCE_MS: u64 = 100;

/// What to attach the watcher to for a report path.
///
/// A single file is watched through its parent directory so the watch
/// survives editors that save by renaming a temp file over the original.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WatchTarget {
    /// Directory handed to the watcher.
    dir: PathBuf,
    /// File name events must mention. `None` accepts every path.
    file_name: Option<OsString>,
    /// Recursive for a directory of definitions, flat for a single file.
    mode: RecursiveMode,
}

impl WatchTarget {
    /// Whether an event should trigger a new report.
    fn accepts(&self, event: &notify::Event) -> bool {
        if !matches!(
            event.kind,
            notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
        ) {
            return false;
        }
        let Some(name) = &self.file_name else {
            return true;
        };
        return event.paths.iter().any(|p| return p.file_name() == Some(name.as_os_str()));
    }

    /// Watch target for a report path.
    fn for_path(path: &Path) -> Self {
        if path.is_dir() {
            return Self { dir: path.to_path_buf(), file_name: None, mode: RecursiveMode::Recursive };
        }
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        return Self {
            dir,
            file_name: path.file_name().map(OsString::from),
            mode: RecursiveMode::NonRecursive,
        };
    }
}

/// Create a filesystem watcher that sends the events `target` accepts on the given channel.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(
    target: WatchTarget,
    tx: crossbeam_channel::Sender<()>,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && target.accepts(&event)
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::WatchFailed { reason: format!("watcher setup failed: {e}") };
    });
}

/// Entry point for `report --watch`.
///
/// Runs an initial report, then watches `path` (recursively for a directory,
/// through its parent for a file) and re-runs the report after each burst of
/// changes. Report errors are printed and watching continues.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created or attached.
pub fn run(path: &Path, request: &ReportRequest) -> Result<(), error::Error> {
    eprintln!("watch: initial report");
    run_report(request);

    let target = WatchTarget::for_path(path);
    let (dir, mode) = (target.dir.clone(), target.mode);
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(target, tx)?;
    watcher.watch(&dir, mode).map_err(|e| {
        return error::Error::WatchFailed { reason: format!("cannot watch {}: {e}", dir.display()) };
    })?;

    eprintln!("watch: monitoring {}, press Ctrl+C to stop", path.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        tracing::debug!(path = %path.display(), "change detected");
        eprintln!("watch: change detected, re-running report...");
        run_report(request);
    }

    return Ok(());
}

/// Run the report once, printing any error instead of stopping.
fn run_report(request: &ReportRequest) {
    if let Err(e) = commands::report(request) {
        diagnostics::print_error(&e);
    }
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, CreateKind, ModifyKind, RenameMode};
    use notify::{Event, EventKind};

    use super::*;

    #[test]
    fn file_is_watched_through_its_parent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pantry.json");
        std::fs::write(&file, "").unwrap();

        let target = WatchTarget::for_path(&file);
        assert_eq!(target.dir, dir.path());
        assert_eq!(target.file_name, Some(OsString::from("pantry.json")));
        assert_eq!(target.mode, RecursiveMode::NonRecursive);
    }

    #[test]
    fn bare_file_name_is_watched_in_the_current_directory() {
        let target = WatchTarget::for_path(Path::new("pantry.json"));
        assert_eq!(target.dir, PathBuf::from("."));
    }

    #[test]
    fn rename_over_the_file_triggers_a_report() {
        let target = WatchTarget::for_path(Path::new("bundles/pantry.json"));
        let replaced = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To)))
            .add_path(PathBuf::from("bundles/pantry.json"));
        let recreated =
            Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("bundles/pantry.json"));
        assert!(target.accepts(&replaced));
        assert!(target.accepts(&recreated));
    }

    #[test]
    fn sibling_files_and_reads_are_ignored() {
        let target = WatchTarget::for_path(Path::new("bundles/pantry.json"));
        let sibling =
            Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("bundles/crafts.txt"));
        let read = Event::new(EventKind::Access(AccessKind::Read))
            .add_path(PathBuf::from("bundles/pantry.json"));
        assert!(!target.accepts(&sibling));
        assert!(!target.accepts(&read));
    }

    #[test]
    fn directory_accepts_changes_anywhere_below_it() {
        let dir = tempfile::tempdir().unwrap();
        let target = WatchTarget::for_path(dir.path());
        assert_eq!(target.mode, RecursiveMode::Recursive);

        let nested = Event::new(EventKind::Create(CreateKind::File)).add_path(dir.path().join("a/b.txt"));
        assert!(target.accepts(&nested));
    }
}
