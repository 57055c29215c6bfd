//! Full-screen map view using the walkers crate.
//!
//! The map is a passive display surface: it renders the viewport, paints
//! the current position marker, and reports a long-press as a coordinate.
//! It owns no business logic.

use eframe::egui;
use parking_lot::Mutex;
use std::sync::Arc;
use walkers::{HttpTiles, Map, MapMemory, Plugin, Position, Projector};

use weatherpin_weather::Coordinate;

struct PendingCenter {
    latitude: f64,
    longitude: f64,
    zoom: f64,
}

pub struct MapPanel {
    /// Tile provider (lazy initialized)
    tiles: Option<HttpTiles>,
    /// Map memory for walkers (stores zoom, center, etc.)
    map_memory: MapMemory,
    /// Recenter request, consumed on the next rendered frame
    pending_center: Option<PendingCenter>,
    /// Last known device position, if any
    my_position: Option<Position>,
    /// Fallback center before the first position fix
    home: Position,
    /// Long-press output slot written by the gesture plugin
    gesture_out: Arc<Mutex<Option<Coordinate>>>,
}

impl MapPanel {
    pub fn new(home_latitude: f64, home_longitude: f64) -> Self {
        Self {
            tiles: None,
            map_memory: MapMemory::default(),
            pending_center: None,
            my_position: None,
            home: walkers::lat_lon(home_latitude, home_longitude),
            gesture_out: Arc::new(Mutex::new(None)),
        }
    }

    /// Ask the map to center on a position at the given zoom on its next
    /// frame.
    pub fn request_center(&mut self, latitude: f64, longitude: f64, zoom: f64) {
        self.pending_center = Some(PendingCenter {
            latitude,
            longitude,
            zoom,
        });
    }

    pub fn set_my_position(&mut self, latitude: f64, longitude: f64) {
        self.my_position = Some(walkers::lat_lon(latitude, longitude));
    }

    /// Initialize tiles if not already done
    fn ensure_tiles(&mut self, ctx: &egui::Context) {
        if self.tiles.is_none() {
            let tiles = HttpTiles::new(walkers::sources::OpenStreetMap, ctx.clone());
            self.tiles = Some(tiles);
        }
    }

    /// Render the map. Returns the long-pressed coordinate, if the user
    /// long-pressed this frame.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<Coordinate> {
        self.ensure_tiles(ui.ctx());

        if let Some(center) = self.pending_center.take() {
            self.map_memory
                .center_at(walkers::lat_lon(center.latitude, center.longitude));
            if let Err(e) = self.map_memory.set_zoom(center.zoom) {
                tracing::debug!("rejected zoom level {}: {:?}", center.zoom, e);
            }
        }

        let my_position = self.my_position.unwrap_or(self.home);

        if let Some(ref mut tiles) = self.tiles {
            let marker = PositionMarkerPlugin {
                position: self.my_position,
            };
            let gesture = GesturePlugin {
                out: self.gesture_out.clone(),
            };
            let map = Map::new(Some(tiles), &mut self.map_memory, my_position)
                .with_plugin(marker)
                .with_plugin(gesture);
            ui.add(map);
        }

        self.gesture_out.lock().take()
    }
}

/// Paints the current device position.
struct PositionMarkerPlugin {
    position: Option<Position>,
}

impl Plugin for PositionMarkerPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        _response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let Some(position) = self.position else {
            return;
        };

        let painter = ui.painter();
        let screen_vec = projector.project(position);
        let screen_pos = egui::pos2(screen_vec.x, screen_vec.y);

        painter.circle_filled(screen_pos, 7.0, egui::Color32::from_rgb(0, 116, 217));
        painter.circle_stroke(screen_pos, 7.0, egui::Stroke::new(1.5, egui::Color32::WHITE));
    }
}

/// Detects a long-press (or secondary click on desktop) and writes the
/// pressed geographic coordinate into the shared out-slot.
struct GesturePlugin {
    out: Arc<Mutex<Option<Coordinate>>>,
}

impl Plugin for GesturePlugin {
    fn run(
        self: Box<Self>,
        _ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        if !(response.long_touched() || response.secondary_clicked()) {
            return;
        }
        let Some(pointer) = response.interact_pointer_pos() else {
            return;
        };

        let position = projector.unproject(pointer.to_vec2());
        // Position is (lon, lat) ordered: x() is longitude, y() is latitude.
        *self.out.lock() = Some(Coordinate::new(position.y(), position.x()));
    }
}
