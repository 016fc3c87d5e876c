//! Background tile fetch.
//!
//! One OS thread per committed batch, kept joinable by the service. The
//! thread owns a blocking HTTP agent and never touches GPU state; completed
//! tiles cross back to the frame thread over the streaming queue.

use crate::config::MapConfig;
use crate::types::{FetchedTile, PendingTile, TileId};
use crossbeam_channel::Sender;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Spawns the fetch thread for one batch of tiles.
///
/// `stop` is checked between tiles, not mid-request; an in-flight request
/// is bounded by the agent timeout instead of being aborted. A tile that
/// fails (non-200 status, transport error, truncated body) is dropped
/// without retry and simply never reaches the atlas.
pub(crate) fn spawn_batch(
    config: &MapConfig,
    batch: Vec<PendingTile>,
    generation: u64,
    tx: Sender<FetchedTile>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    let config = config.clone();

    thread::spawn(move || {
        let agent = ureq::AgentBuilder::new().timeout(config.fetch_timeout).build();

        for tile in batch {
            if stop.load(Ordering::Relaxed) {
                log::debug!("fetch batch generation {generation} cancelled");
                return;
            }

            let Some(bytes) = fetch_tile(&agent, &config, tile.id) else {
                continue;
            };

            let fetched = FetchedTile {
                id: tile.id,
                layer: tile.layer,
                generation,
                bytes,
            };

            if tx.send(fetched).is_err() {
                // Frame side is gone; nothing left to deliver to.
                return;
            }
        }

        log::debug!("fetch batch generation {generation} complete");
    })
}

fn fetch_tile(agent: &ureq::Agent, config: &MapConfig, id: TileId) -> Option<Vec<u8>> {
    let url = config.tile_url(id);

    match agent.get(&url).call() {
        Ok(response) => {
            let mut bytes = Vec::new();
            if let Err(err) = response.into_reader().read_to_end(&mut bytes) {
                log::debug!("tile {id} body truncated: {err}");
                return None;
            }
            Some(bytes)
        }
        Err(err) => {
            log::debug!("tile {id} unavailable: {err}");
            None
        }
    }
}
