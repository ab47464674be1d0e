// Watcher worker: polls the catalog directories' modification times and
// re-lists whichever changed. It only ever writes catalog listings.

use crate::library::{self, Catalog, CatalogKind, SharedCatalog};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

const WATCHED: [CatalogKind; 3] = [CatalogKind::Songs, CatalogKind::Playlists, CatalogKind::Scripts];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Stamp {
    dir: PathBuf,
    modified: Option<SystemTime>,
}

fn stamp(dir: &Path) -> Stamp {
    Stamp {
        dir: dir.to_path_buf(),
        modified: fs::metadata(dir).and_then(|m| m.modified()).ok(),
    }
}

fn snapshot(catalog: &Catalog) -> Vec<(CatalogKind, Stamp)> {
    WATCHED
        .iter()
        .map(|kind| (*kind, stamp(catalog.dir(*kind))))
        .collect()
}

/// Re-list every directory whose stamp moved since `previous`.
fn refresh_changed(
    catalog: &SharedCatalog,
    previous: &[(CatalogKind, Stamp)],
) -> Vec<(CatalogKind, Stamp)> {
    let current = snapshot(&library::read(catalog));
    for ((kind, now), (_, before)) in current.iter().zip(previous) {
        if now != before {
            info!("{:?} directory changed, refreshing", kind);
            library::write(catalog).refresh(*kind);
        }
    }
    current
}

/// Start polling every `interval` until `running` clears. The task is not
/// meant to be awaited.
pub fn spawn(catalog: SharedCatalog, running: Arc<AtomicBool>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stamps = snapshot(&library::read(&catalog));
        while running.load(Ordering::SeqCst) {
            time::sleep(interval).await;
            if !running.load(Ordering::SeqCst) {
                break;
            }
            stamps = refresh_changed(&catalog, &stamps);
        }
        debug!("Watcher finished");
    })
}
