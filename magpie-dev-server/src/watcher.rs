use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use walkdir::WalkDir;

/// One debounced batch of filesystem changes, classified by what happened to
/// each path.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    pub added: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl ChangeSet {
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Watches a directory tree and delivers debounced [`ChangeSet`]s to a
/// callback. Watching stops when the watcher is dropped.
pub struct Watcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
}

impl Watcher {
    /// Watch `root` recursively. Paths are classified against the set of
    /// files seen so far (seeded with an initial walk): an unseen existing
    /// path is an add, a seen one a modification, a vanished one a removal.
    pub fn spawn<F>(root: &Path, on_change: F) -> notify::Result<Self>
    where
        F: Fn(ChangeSet) + Send + 'static,
    {
        let mut seen: HashSet<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.path().to_path_buf())
            .collect();

        let mut debouncer = new_debouncer(
            Duration::from_millis(500),
            move |res: DebounceEventResult| {
                let Ok(events) = res else {
                    return;
                };

                let mut changes = ChangeSet::default();
                for event in events {
                    let path = event.path;
                    if path.is_file() {
                        if seen.insert(path.clone()) {
                            changes.added.push(path);
                        } else {
                            changes.modified.push(path);
                        }
                    } else if seen.remove(&path) {
                        changes.removed.push(path);
                    }
                }

                if !changes.is_empty() {
                    on_change(changes);
                }
            },
        )?;

        debouncer.watcher().watch(root, RecursiveMode::Recursive)?;

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}
