//! Face loading on worker threads.
//!
//! Each [`LoadRequest`] gets its own thread that reads the six face files,
//! decodes them and sends the outcome back tagged with the request's sequence
//! number. The event loop drains the channel once per frame.

use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::thread;

use tour_core::{CubeImages, LoadRequest, TourError};

pub type Completion = (u64, Result<CubeImages, TourError>);

pub fn spawn_load(tiles_root: &Path, req: LoadRequest, done: Sender<Completion>) {
    let root = tiles_root.to_path_buf();
    let seq = req.seq;
    let scene_id = req.scene_id.clone();
    let fallback = done.clone();
    let spawned = thread::Builder::new()
        .name(format!("face-loader-{seq}"))
        .spawn(move || {
            let encoded = req.paths.map(|p| read_face(&root.join(p)));
            let result = CubeImages::from_encoded(&req.scene_id, encoded);
            // The receiver is gone only when the window is closing.
            let _ = done.send((seq, result));
        });
    if let Err(e) = spawned {
        log::error!("[load] could not spawn loader for #{}: {}", seq, e);
        // The session still has #seq in flight and must hear back about it.
        let _ = fallback.send(spawn_failure(seq, &scene_id, &e));
    }
}

/// Completion reported when no loader thread could be started for `seq`.
fn spawn_failure(seq: u64, scene_id: &str, err: &std::io::Error) -> Completion {
    let reason = format!("loader thread did not start: {err}");
    let encoded = std::array::from_fn(|_| Err(reason.clone()));
    (seq, CubeImages::from_encoded(scene_id, encoded))
}

fn read_face(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Scene ids typed on stdin stand in for the companion viewer's switch calls.
pub fn spawn_companion_reader(requests: Sender<String>) {
    let spawned = thread::Builder::new()
        .name("companion-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let id = line.trim();
                if id.is_empty() {
                    continue;
                }
                if requests.send(id.to_string()).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        log::warn!("[companion] stdin reader unavailable: {}", e);
    }
}
