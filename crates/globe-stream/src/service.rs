//! Per-frame orchestration of the dynamic map.

use crate::config::MapConfig;
use crate::fetch;
use crate::types::{FetchedTile, MapCamera, PendingTile, TileId, TileSettings};
use crate::MapError;
use bytemuck::Zeroable;
use crossbeam_channel::{unbounded, Receiver, Sender};
use slippy::window::{visible_window, TileWindow};
use slippy::{coord, grid, SlotTable};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

/// The three capabilities the rendering subsystem provides to this
/// service: wholesale index-buffer replacement, partial upload into one
/// atlas layer, and the per-frame tile settings write.
pub trait MapSurface {
    fn upload_indices(&mut self, indices: &[u32]);
    fn upload_tile_layer(&mut self, layer: u32, width: u32, height: u32, pixels: &[u8]);
    fn write_tile_settings(&mut self, settings: &TileSettings);
}

/// The dynamic map streaming service.
///
/// Owns every piece of state the subsystem mutates: the committed vertex
/// and texture windows, the atlas slot table, the fetch workers and the
/// queue between them and the frame thread. [`MapService::update`] runs
/// once per frame on the render thread and is the only mutator; fetch
/// threads only ever touch the queue's sending half.
pub struct MapService {
    config: MapConfig,
    tx: Sender<FetchedTile>,
    rx: Receiver<FetchedTile>,
    stop: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    /// Monotonic id of the committed texture window. Drained tiles carrying
    /// an older id lost the race to a newer window and are discarded.
    generation: u64,
    vertex_window: Option<TileWindow>,
    texture_window: Option<TileWindow>,
    committed_zoom: u8,
    last_commit: Option<Instant>,
    settings: TileSettings,
    closed: bool,
}

impl MapService {
    /// Validates `config` and creates an idle service. No window exists and
    /// no fetch runs until the first `update`.
    pub fn new(config: MapConfig) -> Result<Self, MapError> {
        config.validate()?;

        let (tx, rx) = unbounded();
        log::info!(
            "map service ready: zoom {}..{}, {} atlas layers, tiles from {}",
            config.min_zoom,
            config.max_zoom,
            config.max_atlas_layers,
            config.tile_server_url
        );

        Ok(Self {
            config,
            tx,
            rx,
            stop: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
            generation: 0,
            vertex_window: None,
            texture_window: None,
            committed_zoom: 0,
            last_commit: None,
            settings: TileSettings::zeroed(),
            closed: false,
        })
    }

    /// Per-frame entry point.
    ///
    /// Recomputes both visibility windows for `camera` at `zoom`, rebuilds
    /// the mesh index window when the vertex window moved, commits a new
    /// texture window (debounced) and dispatches its fetch batch, drains
    /// completed tiles into the atlas, and writes the tile settings block.
    /// An empty window anywhere aborts the remaining steps for this frame
    /// instead of uploading degenerate geometry.
    pub fn update(
        &mut self,
        camera: &MapCamera,
        zoom: u8,
        surface: &mut dyn MapSurface,
    ) -> Result<(), MapError> {
        let (lat, lon) = camera.geodetic();
        let (footprint_h, footprint_v) =
            coord::angular_footprint(camera.fov_y_deg, camera.aspect, camera.altitude());

        // 1. Vertex window; rebuild the index window only when it moved.
        let vertex_zoom = zoom.max(self.config.min_vertex_zoom);
        let vertex_axis =
            coord::tiles_per_axis(vertex_zoom, self.config.min_zoom, self.config.max_zoom)?;
        let vertex_window = visible_window(lat, lon, footprint_h, footprint_v, vertex_axis);
        if vertex_window.is_empty() {
            return Ok(());
        }

        if self.vertex_window != Some(vertex_window) {
            let indices = grid::grid_indices(&vertex_window);
            if indices.is_empty() {
                return Ok(());
            }
            surface.upload_indices(&indices);
            self.vertex_window = Some(vertex_window);
            self.settings.vertex_tiles_per_axis = vertex_axis;
        }

        // 2. Texture window, committed behind the debounce gate.
        let texture_axis =
            coord::tiles_per_axis(zoom, self.config.min_zoom, self.config.max_zoom)?;
        let texture_window = visible_window(lat, lon, footprint_h, footprint_v, texture_axis);
        if texture_window.is_empty() {
            return Ok(());
        }

        if self.texture_window != Some(texture_window) && self.commit_allowed(zoom) {
            self.commit_texture_window(zoom, texture_window);
        }

        // 3. Drain completed tiles into the atlas.
        self.drain(surface);

        // 4. Tile settings for this frame's draw.
        surface.write_tile_settings(&self.settings);
        Ok(())
    }

    /// A differing window commits immediately when the zoom changed and
    /// only after the debounce interval when the camera merely moved.
    fn commit_allowed(&self, zoom: u8) -> bool {
        match (self.texture_window.as_ref(), self.last_commit) {
            (None, _) | (_, None) => true,
            (Some(_), Some(at)) => {
                zoom != self.committed_zoom || at.elapsed() >= self.config.debounce
            }
        }
    }

    fn commit_texture_window(&mut self, zoom: u8, window: TileWindow) {
        let slots = match SlotTable::new(&window, self.config.max_atlas_layers) {
            Ok(slots) => slots,
            Err(err) => {
                // Fail closed: keep the previous layout instead of writing
                // past the end of the atlas.
                log::error!("texture window rejected: {err}");
                return;
            }
        };

        self.generation += 1;

        let mut batch =
            Vec::with_capacity(window.width() as usize * window.count_y as usize);
        for x in window.min_x..window.max_x {
            for y in window.min_y..window.max_y {
                let id = TileId {
                    zoom,
                    x: window.wrap_x(x),
                    y: window.clamp_y(y),
                };
                batch.push(PendingTile { id, layer: slots.layer_for(x, y) });
            }
        }
        // Rows clamped at a pole collapse onto the same edge tile; fetching
        // it once is enough.
        batch.dedup();

        log::info!(
            "committed texture window generation {} at zoom {zoom}: {}x{} tiles, {} fetches",
            self.generation,
            window.width(),
            window.count_y,
            batch.len()
        );

        let worker = fetch::spawn_batch(
            &self.config,
            batch,
            self.generation,
            self.tx.clone(),
            self.stop.clone(),
        );
        self.workers.retain(|handle| !handle.is_finished());
        self.workers.push(worker);

        let (origin_x, origin_y) = slots.origin();
        self.settings.texture_tiles_per_axis = window.tiles_per_axis;
        self.settings.min_tile_x = origin_x;
        self.settings.min_tile_y = origin_y;
        self.settings.tiles_count_y = window.count_y;

        self.texture_window = Some(window);
        self.committed_zoom = zoom;
        self.last_commit = Some(Instant::now());
    }

    /// Drains the queue completely, decoding and uploading every tile that
    /// still belongs to the committed window generation.
    fn drain(&mut self, surface: &mut dyn MapSurface) {
        while let Ok(tile) = self.rx.try_recv() {
            if tile.generation != self.generation {
                log::debug!(
                    "dropping tile {} from superseded generation {}",
                    tile.id,
                    tile.generation
                );
                continue;
            }

            let image = match decode_tile(&tile) {
                Ok(image) => image,
                Err(err) => {
                    // A corrupt tile is a skip, not a crash; its layer
                    // keeps whatever it held before.
                    log::warn!("tile {}: {err}", tile.id);
                    continue;
                }
            };

            let (width, height) = image.dimensions();
            surface.upload_tile_layer(tile.layer, width, height, image.as_raw());
        }
    }

    /// Tears the service down: raises the stop flag the fetch threads
    /// check between tiles, then joins every worker, so nothing writes to
    /// the queue once this returns. Idempotent; also run by `Drop`.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.stop.store(true, Ordering::Relaxed);

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("fetch worker panicked during shutdown");
            }
        }

        log::info!("map service closed");
    }

    /// The currently committed tile settings block.
    pub fn settings(&self) -> &TileSettings {
        &self.settings
    }
}

impl Drop for MapService {
    fn drop(&mut self) {
        self.close();
    }
}

fn decode_tile(tile: &FetchedTile) -> Result<image::RgbaImage, MapError> {
    Ok(image::load_from_memory(&tile.bytes)?.into_rgba8())
}
