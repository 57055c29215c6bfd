//! The eframe application shell: owns the state, the map panel, and the
//! bridge between the UI thread and the tokio tasks doing network and
//! location work.

use std::sync::Arc;
use std::time::Instant;

use eframe::egui;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use weatherpin_core::{AppState, Config, Viewport};
use weatherpin_weather::{
    location, Coordinate, LocationError, LookupOutcome, PositionUpdate, ReverseGeocoder,
    WatchOptions, WeatherApiProvider, WeatherLookup,
};

use crate::dialogs;
use crate::error_mapping;
use crate::map::MapPanel;

/// Everything the background tasks report back to the UI thread.
pub enum UiEvent {
    Position(PositionUpdate),
    LocationFailed(LocationError),
    LookupDone {
        seq: u64,
        outcome: Option<LookupOutcome>,
    },
}

pub struct WeatherPinApp {
    state: AppState,
    map: MapPanel,

    events_tx: mpsc::UnboundedSender<UiEvent>,
    events_rx: mpsc::UnboundedReceiver<UiEvent>,
    runtime: Handle,
    lookup: Arc<WeatherLookup>,

    /// Cancelling this releases the location subscription.
    location_cancel: CancellationToken,
    location_notice: Option<&'static str>,
}

impl WeatherPinApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config, runtime: Handle) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let viewport = Viewport::new(
            config.map.latitude,
            config.map.longitude,
            config.map.span_degrees,
        );

        let api_key = config.weather_api_key().unwrap_or_default();
        let lookup = Arc::new(WeatherLookup::new(
            ReverseGeocoder::new(),
            WeatherApiProvider::new(api_key, config.weather.base_url.clone()),
        ));

        let location_cancel = CancellationToken::new();
        let options = WatchOptions {
            distance_interval_m: config.location.distance_interval_m,
            ..WatchOptions::default()
        };
        spawn_location_task(
            &runtime,
            events_tx.clone(),
            cc.egui_ctx.clone(),
            location_cancel.clone(),
            options,
        );

        let mut map = MapPanel::new(viewport.latitude, viewport.longitude);
        map.request_center(viewport.latitude, viewport.longitude, viewport.zoom());

        Self {
            state: AppState::new(viewport),
            map,
            events_tx,
            events_rx,
            runtime,
            lookup,
            location_cancel,
            location_notice: None,
        }
    }

    fn drain_events(&mut self, now: Instant) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event, now);
        }
    }

    fn handle_event(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::Position(update) => {
                self.state
                    .apply_position(update.coordinate.latitude, update.coordinate.longitude);
                self.map
                    .set_my_position(update.coordinate.latitude, update.coordinate.longitude);
            }
            UiEvent::LocationFailed(e) => {
                tracing::warn!("location tracking unavailable: {}", e);
                self.location_notice = Some(error_mapping::location_app_error(&e).user_message());
            }
            UiEvent::LookupDone { seq, outcome } => {
                let outcome = outcome.map(|o| (o.place.to_string(), o.temperature_c));
                self.state.finish_lookup(seq, outcome, now);
            }
        }
    }

    fn start_lookup(&mut self, ctx: &egui::Context, coordinate: Coordinate) {
        let seq = self.state.begin_lookup();
        tracing::debug!(
            seq,
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            "starting weather lookup"
        );

        let lookup = self.lookup.clone();
        let tx = self.events_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let outcome = lookup.lookup(coordinate).await;
            let _ = tx.send(UiEvent::LookupDone { seq, outcome });
            ctx.request_repaint();
        });
    }
}

impl eframe::App for WeatherPinApp {
    fn ui(&mut self, ui: &mut egui::Ui, _frame: &mut eframe::Frame) {
        let ctx = ui.ctx().clone();
        let ctx = &ctx;
        let now = Instant::now();
        self.drain_events(now);
        self.state.banner.tick(now);

        if let Some((lat, lon)) = self.state.take_recenter() {
            self.map.request_center(lat, lon, self.state.viewport.zoom());
        }

        let long_press = egui::CentralPanel::default()
            .show(ctx, |ui| self.map.show(ui))
            .inner;
        if let Some(coordinate) = long_press {
            self.start_lookup(ctx, coordinate);
        }

        dialogs::weather_popup(ctx, &mut self.state.popup);
        dialogs::error_banner(ctx, &self.state.banner, now);
        dialogs::location_notice(ctx, &mut self.location_notice);
    }
}

impl Drop for WeatherPinApp {
    fn drop(&mut self) {
        // Release the sensor subscription no matter how the shell exits.
        self.location_cancel.cancel();
    }
}

fn spawn_location_task(
    runtime: &Handle,
    tx: mpsc::UnboundedSender<UiEvent>,
    ctx: egui::Context,
    cancel: CancellationToken,
    options: WatchOptions,
) {
    runtime.spawn(async move {
        let Some(source) = location::system_source() else {
            let _ = tx.send(UiEvent::LocationFailed(LocationError::ServiceUnavailable));
            ctx.request_repaint();
            return;
        };

        match source.watch(options).await {
            Ok(mut subscription) => loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        subscription.stop();
                        break;
                    }
                    update = subscription.next() => match update {
                        Some(update) => {
                            if tx.send(UiEvent::Position(update)).is_err() {
                                break;
                            }
                            ctx.request_repaint();
                        }
                        None => break,
                    }
                }
            },
            Err(e) => {
                let _ = tx.send(UiEvent::LocationFailed(e));
                ctx.request_repaint();
            }
        }
    });
}
