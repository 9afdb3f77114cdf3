//! Event-driven compass API
//!
//! `CompassApi` owns all mutable compass state: the latest position, the
//! fused heading, the cast session and the destination. Platform callbacks
//! write into it (directly or through queued sources) and one display loop
//! reads it through `process_cycle`. Nothing here blocks or is shared across
//! threads; an embedder with real threads wraps the whole aggregate in one
//! mutex.

use crate::algorithms::geodesy;
use crate::api::gesture::Swipe;
use crate::api::session::{CastSession, SwipeResult};
use crate::api::types::{ApiResult, CompassEvent, CompassSnapshot, PositionStatus};
use crate::core::{Destination, DestinationOrigin, Position};
use crate::hardware::{
    OrientationChannel, OrientationReading, OrientationSource, PositionSource, SensorError,
};
use crate::processing::{DestinationParser, HeadingFusion, HeadingReading};
use crate::utils::store::{self, KeyValueStore};
use crate::utils::CompassConfig;
use crate::validation::ArrivalEvaluator;
use std::collections::HashMap;

/// Callback function type for compass events
pub type EventCallback = Box<dyn Fn(&CompassEvent) + Send>;

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

pub struct CompassApi {
    config: CompassConfig,
    parser: DestinationParser,
    fusion: HeadingFusion,
    session: CastSession,
    arrival: ArrivalEvaluator,
    position: Option<Position>,
    position_status: PositionStatus,
    destination: Option<Destination>,
    /// Arrival state at the end of the previous cycle
    arrived: bool,
    position_source: Option<Box<dyn PositionSource>>,
    orientation_sources: Vec<Box<dyn OrientationSource>>,
    store: Box<dyn KeyValueStore>,
    callback_counter: u32,
    callbacks: HashMap<CallbackHandle, EventCallback>,
}

impl CompassApi {
    /// Create the aggregate and restore the saved destination, if any.
    /// Fails when `config` does not validate.
    pub fn new(config: CompassConfig, backend: Box<dyn KeyValueStore>) -> ApiResult<Self> {
        config.validate()?;
        let destination =
            store::load_destination(backend.as_ref(), &config.storage.destination_key);
        if let Some(saved) = &destination {
            tracing::info!(lat = saved.lat, lng = saved.lng, origin = %saved.origin, "restored destination");
        }

        Ok(Self {
            parser: DestinationParser::new(),
            fusion: HeadingFusion::new(),
            session: CastSession::new(&config),
            arrival: ArrivalEvaluator::new(config.arrival_min_radius_m),
            position: None,
            position_status: PositionStatus::Waiting,
            destination,
            arrived: false,
            position_source: None,
            orientation_sources: Vec::new(),
            store: backend,
            callback_counter: 0,
            callbacks: HashMap::new(),
            config,
        })
    }

    pub fn with_position_source(mut self, source: Box<dyn PositionSource>) -> Self {
        self.position_source = Some(source);
        self
    }

    pub fn add_orientation_source(&mut self, source: Box<dyn OrientationSource>) {
        self.orientation_sources.push(source);
    }

    /// Subscribe to every attached source. A source that fails to start is
    /// logged and left out; the compass runs with whatever remains.
    pub fn start(&mut self) {
        if let Some(source) = self.position_source.as_mut() {
            if let Err(e) = source.start() {
                tracing::warn!(error = %e, "position source failed to start");
                self.position_status = PositionStatus::Error(e);
            }
        }

        for source in &mut self.orientation_sources {
            let channel = source.channel();
            match source.start() {
                Ok(()) => self.fusion.register(channel),
                Err(e) => tracing::warn!(?channel, error = %e, "orientation source failed to start"),
            }
        }
    }

    pub fn config(&self) -> &CompassConfig {
        &self.config
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn position_status(&self) -> PositionStatus {
        self.position_status
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn heading(&self) -> HeadingReading {
        self.fusion.reading()
    }

    pub fn session(&self) -> &CastSession {
        &self.session
    }

    /// Drag, release and tick input for an active cast session
    pub fn session_mut(&mut self) -> &mut CastSession {
        &mut self.session
    }

    /// Replace the current position with a new fix
    pub fn update_position(&mut self, position: Position) {
        self.position = Some(position);
        self.position_status = PositionStatus::Tracking;
    }

    /// Record a position source error. The last fix is kept; an error the
    /// source cannot recover from also unsubscribes it.
    pub fn report_position_error(&mut self, error: SensorError) {
        tracing::warn!(error = %error, "position source error");
        self.position_status = PositionStatus::Error(error);
        if !error.is_recoverable() {
            if let Some(source) = self.position_source.as_mut() {
                source.stop();
            }
        }
    }

    /// Accept pushed readings on `channel` without an attached source.
    /// Shutdown unregisters it again.
    pub fn register_orientation_channel(&mut self, channel: OrientationChannel) {
        self.fusion.register(channel);
    }

    /// Feed one orientation reading to the heading fusion. Readings on a
    /// channel that is neither started nor registered are ignored.
    pub fn ingest_orientation(&mut self, reading: &OrientationReading) -> bool {
        self.fusion.ingest(reading)
    }

    /// Drain every source, then evaluate the compass for this display cycle
    pub fn process_cycle(&mut self, now_ms: u64) -> CompassSnapshot {
        self.pump_sources();

        let heading = self.fusion.heading();
        let heading_stale = heading.is_some()
            && self.fusion.is_stale(now_ms, self.config.heading.stale_after_ms);

        let mut snapshot = CompassSnapshot {
            heading,
            tier: self.fusion.tier(),
            heading_stale,
            bearing: None,
            distance_m: None,
            relative_bearing: None,
            arrived: false,
            position_status: self.position_status,
        };

        if let (Some(position), Some(destination)) = (self.position, self.destination) {
            let here = position.coordinate();
            let there = destination.coordinate();
            let bearing = geodesy::bearing(&here, &there);
            snapshot.bearing = Some(bearing);
            snapshot.distance_m = Some(geodesy::distance(&here, &there));
            snapshot.relative_bearing = heading.map(|h| geodesy::relative_bearing(bearing, h));
            snapshot.arrived = self.arrival.has_arrived(&position, &destination);

            if snapshot.arrived && !self.arrived {
                tracing::info!(lat = destination.lat, lng = destination.lng, "arrived at destination");
                self.trigger_event(CompassEvent::Arrived(destination));
            }
        }
        self.arrived = snapshot.arrived;

        snapshot
    }

    fn pump_sources(&mut self) {
        let mut fixes = Vec::new();
        if let Some(source) = self.position_source.as_mut() {
            loop {
                match source.poll() {
                    Ok(Some(position)) => fixes.push(Ok(position)),
                    Ok(None) => break,
                    // Anything queued behind an error waits for the next cycle
                    Err(e) => {
                        fixes.push(Err(e));
                        break;
                    }
                }
            }
        }
        for fix in fixes {
            match fix {
                Ok(position) => self.update_position(position),
                Err(e) => self.report_position_error(e),
            }
        }

        for source in &mut self.orientation_sources {
            while let Some(reading) = source.poll() {
                self.fusion.ingest(&reading);
            }
        }
    }

    /// Parse typed or pasted text and make it the destination.
    ///
    /// The initial distance is measured from the current fix, or 0 without
    /// one.
    pub fn set_destination_text(&mut self, text: &str) -> ApiResult<Destination> {
        let parsed = self.parser.parse(text)?;
        let target = parsed.coordinate();
        let initial_distance = self
            .position
            .map(|position| geodesy::distance(&position.coordinate(), &target))
            .unwrap_or(0.0);

        let destination = Destination::new(target, DestinationOrigin::Typed, initial_distance)?;
        tracing::info!(format = %parsed.format, lat = target.lat, lng = target.lng, "destination set from text");
        self.commit_destination(destination)?;
        Ok(destination)
    }

    /// Feed a completed swipe to the cast session
    pub fn on_swipe(&mut self, swipe: &Swipe) -> SwipeResult {
        self.session.on_swipe(swipe, self.position.as_ref())
    }

    /// Commit the active cast along the current heading
    pub fn commit_cast(&mut self) -> ApiResult<Destination> {
        let destination = self.session.commit(self.fusion.heading(), self.position.as_ref())?;
        self.commit_destination(destination)?;
        Ok(destination)
    }

    pub fn cancel_cast(&mut self) -> bool {
        self.session.cancel()
    }

    /// Install a new destination, notify listeners and persist it.
    ///
    /// The destination takes effect even when saving fails; the store error
    /// is still returned so the caller can warn that it will not survive a
    /// restart.
    fn commit_destination(&mut self, destination: Destination) -> ApiResult<()> {
        self.destination = Some(destination);
        self.arrived = false;
        self.trigger_event(CompassEvent::DestinationCommitted(destination));

        let key = &self.config.storage.destination_key;
        store::save_destination(self.store.as_mut(), key, &destination)?;
        Ok(())
    }

    pub fn clear_destination(&mut self) -> ApiResult<()> {
        self.destination = None;
        self.arrived = false;
        store::clear_destination(self.store.as_mut(), &self.config.storage.destination_key)?;
        Ok(())
    }

    /// Register an event callback
    pub fn register_callback<F>(&mut self, callback: F) -> CallbackHandle
    where
        F: Fn(&CompassEvent) + Send + 'static,
    {
        self.callback_counter += 1;
        let handle = CallbackHandle(self.callback_counter);
        self.callbacks.insert(handle, Box::new(callback));
        handle
    }

    /// Unregister a callback. Returns false for an unknown handle.
    pub fn unregister_callback(&mut self, handle: CallbackHandle) -> bool {
        self.callbacks.remove(&handle).is_some()
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    fn trigger_event(&self, event: CompassEvent) {
        for callback in self.callbacks.values() {
            callback(&event);
        }
    }

    /// Unsubscribe every source and drop transient state. The destination
    /// stays; it is persisted.
    pub fn shutdown(&mut self) {
        if let Some(source) = self.position_source.as_mut() {
            source.stop();
        }
        for source in &mut self.orientation_sources {
            source.stop();
        }
        self.fusion.teardown();
        self.session.cancel();
        self.position = None;
        self.position_status = PositionStatus::Waiting;
        self.arrived = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{MockOrientationSource, MockPositionSource};
    use crate::api::types::ApiError;
    use crate::processing::HeadingTier;
    use crate::utils::ConfigError;
    use crate::utils::MemoryStore;
    use std::sync::{Arc, Mutex};

    fn api() -> CompassApi {
        CompassApi::new(CompassConfig::default(), Box::new(MemoryStore::new())).unwrap()
    }

    fn fix(lat: f64, lng: f64, accuracy_m: f64) -> Position {
        Position::new(lat, lng, accuracy_m).unwrap()
    }

    fn recorder(api: &mut CompassApi) -> Arc<Mutex<Vec<CompassEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        api.register_callback(move |event| sink.lock().unwrap().push(*event));
        events
    }

    fn activate_cast(api: &mut CompassApi) {
        api.on_swipe(&Swipe::upward(80.0, 0, 100));
        api.on_swipe(&Swipe::upward(80.0, 400, 100));
        let result = api.on_swipe(&Swipe::upward(80.0, 800, 100));
        assert!(matches!(result, SwipeResult::Activated { .. }));
    }

    #[test]
    fn test_snapshot_without_inputs() {
        let mut api = api();
        api.start();
        let snapshot = api.process_cycle(0);
        assert_eq!(snapshot.heading, None);
        assert_eq!(snapshot.tier, HeadingTier::Unavailable);
        assert_eq!(snapshot.bearing, None);
        assert!(!snapshot.arrived);
        assert_eq!(snapshot.position_status, PositionStatus::Waiting);
    }

    #[test]
    fn test_typed_destination_bearing_and_distance() {
        let mut api = api();
        api.update_position(fix(40.0, -74.0, 5.0));

        let destination = api.set_destination_text("40.1, -74.0").unwrap();
        assert_eq!(destination.origin, DestinationOrigin::Typed);
        assert!((destination.initial_distance_meters - 11_119.5).abs() < 1.0);

        let snapshot = api.process_cycle(0);
        assert!(snapshot.bearing.unwrap().abs() < 1e-6);
        assert!((snapshot.distance_m.unwrap() - 11_119.5).abs() < 1.0);
        assert_eq!(snapshot.relative_bearing, None);
    }

    #[test]
    fn test_typed_destination_without_fix_has_zero_distance() {
        let mut api = api();
        let destination = api.set_destination_text("48.8566 2.3522").unwrap();
        assert_eq!(destination.initial_distance_meters, 0.0);
        assert!(api.set_destination_text("somewhere nice").is_err());
        assert_eq!(api.destination(), Some(&destination));
    }

    #[test]
    fn test_sources_drive_snapshot() {
        let mut position = MockPositionSource::new();
        position.push_fix(fix(40.0, -74.0, 5.0));
        let mut absolute = MockOrientationSource::new(OrientationChannel::Absolute);
        absolute.push(OrientationReading::absolute(Some(270.0), 1_000));

        let mut api = api().with_position_source(Box::new(position));
        api.add_orientation_source(Box::new(absolute));
        api.add_orientation_source(Box::new(MockOrientationSource::unsupported(
            OrientationChannel::Standard,
        )));
        api.start();
        api.set_destination_text("40.1, -74.0").unwrap();

        let snapshot = api.process_cycle(1_500);
        assert_eq!(snapshot.position_status, PositionStatus::Tracking);
        assert_eq!(snapshot.tier, HeadingTier::Absolute);
        // alpha 270 counter-clockwise is heading 90; destination due north
        assert!((snapshot.heading.unwrap() - 90.0).abs() < 1e-9);
        assert!((snapshot.relative_bearing.unwrap() - 270.0).abs() < 1e-6);
        assert!(!snapshot.heading_stale);

        let later = api.process_cycle(10_000);
        assert!(later.heading_stale);
        assert_eq!(later.heading, snapshot.heading);
    }

    #[test]
    fn test_permission_denied_stops_position_source() {
        let mut source = MockPositionSource::new();
        source.push_error(SensorError::PermissionDenied);
        source.push_fix(fix(1.0, 1.0, 5.0));

        let mut api = api().with_position_source(Box::new(source));
        api.start();
        let snapshot = api.process_cycle(0);
        assert_eq!(snapshot.position_status, PositionStatus::Error(SensorError::PermissionDenied));
        assert!(api.position().is_none());

        let again = api.process_cycle(16);
        assert!(api.position().is_none());
        assert_eq!(again.position_status, PositionStatus::Error(SensorError::PermissionDenied));
    }

    #[test]
    fn test_position_source_start_failure_degrades() {
        let source = MockPositionSource::failing_with(SensorError::Unavailable);
        let mut api = api().with_position_source(Box::new(source));
        api.start();
        let snapshot = api.process_cycle(0);
        assert_eq!(snapshot.position_status, PositionStatus::Error(SensorError::Unavailable));

        // Fixes pushed by the embedder still work
        api.update_position(fix(1.0, 2.0, 3.0));
        assert_eq!(api.process_cycle(16).position_status, PositionStatus::Tracking);
    }

    #[test]
    fn test_timeout_keeps_last_fix() {
        let mut api = api();
        api.update_position(fix(10.0, 10.0, 5.0));
        api.report_position_error(SensorError::Timeout);
        assert!(api.position().is_some());
        assert_eq!(api.position_status(), PositionStatus::Error(SensorError::Timeout));
    }

    #[test]
    fn test_arrival_fires_once_per_entry() {
        let mut api = api();
        let events = recorder(&mut api);
        api.update_position(fix(40.0, -74.0, 5.0));
        // About 5.6 m north
        api.set_destination_text("40.00005, -74.0").unwrap();

        assert!(api.process_cycle(0).arrived);
        assert!(api.process_cycle(16).arrived);

        api.update_position(fix(40.01, -74.0, 5.0));
        assert!(!api.process_cycle(32).arrived);
        api.update_position(fix(40.0, -74.0, 5.0));
        assert!(api.process_cycle(48).arrived);

        let arrivals = events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| matches!(event, CompassEvent::Arrived(_)))
            .count();
        assert_eq!(arrivals, 2);
    }

    #[test]
    fn test_poor_accuracy_widens_arrival() {
        let mut api = api();
        api.update_position(fix(40.0, -74.0, 50.0));
        // About 33 m north
        api.set_destination_text("40.0003, -74.0").unwrap();
        assert!(api.process_cycle(0).arrived);

        api.update_position(fix(40.0, -74.0, 5.0));
        assert!(!api.process_cycle(16).arrived);
    }

    #[test]
    fn test_cast_commit_persists_and_notifies() {
        let mut api = api();
        let events = recorder(&mut api);
        api.update_position(fix(40.0, -74.0, 5.0));
        api.start();
        activate_cast(&mut api);

        // No orientation source: no heading to cast along
        assert!(api.commit_cast().is_err());
        assert!(api.session().is_active());

        api.register_orientation_channel(OrientationChannel::Absolute);
        api.ingest_orientation(&OrientationReading::absolute(Some(0.0), 10));
        let destination = api.commit_cast().unwrap();
        assert_eq!(destination.origin, DestinationOrigin::Cast);
        assert_eq!(destination.initial_distance_meters, 100.0);
        assert!(!api.session().is_active());

        let saved = store::load_destination(api.store.as_ref(), &api.config.storage.destination_key)
            .unwrap();
        assert!((saved.lat - destination.lat).abs() < 1e-12);
        assert!((saved.lng - destination.lng).abs() < 1e-12);
        assert_eq!(saved.origin, DestinationOrigin::Cast);
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[CompassEvent::DestinationCommitted(destination)]
        );
    }

    #[test]
    fn test_saved_destination_restored() {
        let config = CompassConfig::default();
        let mut memory = MemoryStore::new();
        let saved = Destination::new(
            crate::core::Coordinate::new(51.5, -0.12).unwrap(),
            DestinationOrigin::Cast,
            400.0,
        )
        .unwrap();
        store::save_destination(&mut memory, &config.storage.destination_key, &saved).unwrap();

        let api = CompassApi::new(config, Box::new(memory)).unwrap();
        assert_eq!(api.destination(), Some(&saved));
    }

    #[test]
    fn test_corrupt_saved_destination_ignored() {
        let config = CompassConfig::default();
        let mut memory = MemoryStore::new();
        memory.set(&config.storage.destination_key, "{not json").unwrap();

        let api = CompassApi::new(config, Box::new(memory)).unwrap();
        assert!(api.destination().is_none());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = CompassConfig::default();
        config.cast.momentum_decay_per_frame = 1.0;
        let result = CompassApi::new(config, Box::new(MemoryStore::new()));
        assert!(matches!(
            result,
            Err(ApiError::Config(ConfigError::InvalidParameter { ref parameter, .. }))
                if parameter == "cast.momentum_decay_per_frame"
        ));
    }

    #[test]
    fn test_pushed_orientation_without_sources() {
        let mut api = api();
        api.start();

        // Channel not registered yet
        assert!(!api.ingest_orientation(&OrientationReading::absolute(Some(90.0), 10)));
        assert_eq!(api.heading().tier, HeadingTier::Unavailable);

        api.register_orientation_channel(OrientationChannel::Absolute);
        assert!(api.ingest_orientation(&OrientationReading::absolute(Some(90.0), 20)));
        assert_eq!(api.heading().tier, HeadingTier::Absolute);
        assert_eq!(api.heading().degrees, Some(270.0));

        api.update_position(fix(40.0, -74.0, 5.0));
        activate_cast(&mut api);
        let destination = api.commit_cast().unwrap();
        let origin = fix(40.0, -74.0, 5.0).coordinate();
        let bearing = geodesy::bearing(&origin, &destination.coordinate());
        assert!((bearing - 270.0).abs() < 0.01);

        api.shutdown();
        assert!(!api.ingest_orientation(&OrientationReading::absolute(Some(10.0), 30)));
        assert_eq!(api.heading().degrees, None);
    }

    #[test]
    fn test_unregister_callback() {
        let mut api = api();
        let handle = api.register_callback(|_| {});
        assert_eq!(api.callback_count(), 1);
        assert!(api.unregister_callback(handle));
        assert!(!api.unregister_callback(handle));
        assert_eq!(api.callback_count(), 0);
    }

    #[test]
    fn test_shutdown_resets_heading_and_session() {
        let mut absolute = MockOrientationSource::new(OrientationChannel::Absolute);
        absolute.push(OrientationReading::absolute(Some(10.0), 0));
        let mut api = api();
        api.add_orientation_source(Box::new(absolute));
        api.start();
        api.update_position(fix(0.0, 0.0, 5.0));
        assert_eq!(api.process_cycle(0).tier, HeadingTier::Absolute);
        activate_cast(&mut api);

        api.shutdown();
        assert_eq!(api.heading().tier, HeadingTier::Unavailable);
        assert_eq!(api.heading().degrees, None);
        assert!(!api.session().is_active());
        assert!(api.position().is_none());
    }
}
