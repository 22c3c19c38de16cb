//! Track and vehicle stores
//!
//! Official catalogs ship embedded in the binary; custom tracks round-trip
//! through a single keyed LocalStorage blob in the browser and an in-memory
//! list natively. Load failures degrade to an empty catalog with a logged
//! error - they never take the game down.

use thiserror::Error;

use crate::track::{validate, Classification, Track};
use crate::vehicle::{validate_vehicle, Vehicle};

const OFFICIAL_TRACKS_JSON: &str = include_str!("../../data/tracks/official.json");
const OFFICIAL_VEHICLES_JSON: &str = include_str!("../../data/vehicles/official.json");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("persistent storage unavailable: {0}")]
    Storage(String),
}

/// Wall-clock time in ms since the unix epoch
pub fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

/// Catalog of official and custom tracks
#[derive(Debug, Default)]
pub struct TrackStore {
    official: Vec<Track>,
    custom: Vec<Track>,
}

impl TrackStore {
    /// LocalStorage key for the custom-track blob
    pub const STORAGE_KEY: &'static str = "slipstream_custom_tracks";

    /// Load both catalogs, validating and classifying every record
    pub fn load() -> Self {
        Self {
            official: Self::load_official(),
            custom: Self::load_custom(),
        }
    }

    fn load_official() -> Vec<Track> {
        match serde_json::from_str::<Vec<Track>>(OFFICIAL_TRACKS_JSON) {
            Ok(mut tracks) => {
                for track in &mut tracks {
                    validate::classify(track);
                }
                log::info!("Loaded {} official tracks", tracks.len());
                tracks
            }
            Err(err) => {
                log::error!("Failed to load official tracks: {err}");
                Vec::new()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn load_custom() -> Vec<Track> {
        let Some(storage) = local_storage() else {
            log::error!("LocalStorage unavailable; no custom tracks");
            return Vec::new();
        };
        let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) else {
            log::info!("No custom tracks found");
            return Vec::new();
        };
        match serde_json::from_str::<Vec<Track>>(&json) {
            Ok(mut tracks) => {
                for track in &mut tracks {
                    validate::classify(track);
                }
                log::info!("Loaded {} custom tracks", tracks.len());
                tracks
            }
            Err(err) => {
                log::error!("Failed to parse custom tracks: {err}");
                Vec::new()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load_custom() -> Vec<Track> {
        // Natively the custom catalog lives for the process only
        Vec::new()
    }

    /// Save (or update, keyed by id) a custom track
    ///
    /// The record is re-validated on the way in: a failing track is still
    /// stored, tagged `Invalid` with its error list, so the author can come
    /// back to it.
    pub fn save_custom_track(&mut self, track: &Track) -> Result<(), StoreError> {
        let mut record = track.clone();
        let report = validate::classify(&mut record);
        if report.is_valid && record.classification != Classification::Official {
            record.classification = Classification::Custom;
        }
        if record.created_at_ms == 0.0 {
            record.created_at_ms = now_ms();
        }

        match self.custom.iter_mut().find(|t| t.id == record.id) {
            Some(existing) => *existing = record,
            None => self.custom.push(record),
        }
        self.persist()?;
        log::info!("Saved custom track '{}'", track.name);
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn persist(&self) -> Result<(), StoreError> {
        let storage =
            local_storage().ok_or_else(|| StoreError::Storage("LocalStorage unavailable".into()))?;
        let json = serde_json::to_string(&self.custom)?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| StoreError::Storage("LocalStorage write failed".into()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn persist(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Every known track, official catalog first
    pub fn all_tracks(&self) -> Vec<&Track> {
        self.official.iter().chain(self.custom.iter()).collect()
    }

    pub fn track_by_id(&self, id: &str) -> Option<&Track> {
        self.all_tracks().into_iter().find(|t| t.id == id)
    }
}

/// Catalog of drivable vehicles
#[derive(Debug, Default)]
pub struct VehicleStore {
    vehicles: Vec<Vehicle>,
}

impl VehicleStore {
    /// Load the embedded vehicle catalog, annotating invalid records
    pub fn load() -> Self {
        let vehicles = match serde_json::from_str::<Vec<Vehicle>>(OFFICIAL_VEHICLES_JSON) {
            Ok(mut vehicles) => {
                for vehicle in &mut vehicles {
                    let errors = validate_vehicle(vehicle);
                    vehicle.validation_errors = if errors.is_empty() {
                        None
                    } else {
                        Some(errors)
                    };
                }
                log::info!("Loaded {} vehicles", vehicles.len());
                vehicles
            }
            Err(err) => {
                log::error!("Failed to load vehicles: {err}");
                Vec::new()
            }
        };
        Self { vehicles }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle_by_id(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Vehicles eligible for race selection
    pub fn race_ready(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles
            .iter()
            .filter(|v| v.validation_errors.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::test_support::ring_track;

    #[test]
    fn test_official_tracks_load_and_validate() {
        let store = TrackStore::load();
        let tracks = store.all_tracks();
        assert!(!tracks.is_empty());
        for track in &tracks {
            assert_eq!(track.classification, Classification::Official);
            assert!(track.validation_errors.is_none());
            assert!(track.is_race_eligible());
        }
    }

    #[test]
    fn test_save_custom_track_upserts_by_id() {
        let mut store = TrackStore::load();
        let official_count = store.all_tracks().len();

        let mut track = ring_track(6, 200.0, 20.0);
        store.save_custom_track(&track).unwrap();
        assert_eq!(store.all_tracks().len(), official_count + 1);

        // Saving the same id again replaces, not duplicates
        track.name = "Renamed Ring".to_string();
        store.save_custom_track(&track).unwrap();
        assert_eq!(store.all_tracks().len(), official_count + 1);
        assert_eq!(store.track_by_id(&track.id).unwrap().name, "Renamed Ring");
    }

    #[test]
    fn test_saved_track_gets_timestamp() {
        let mut store = TrackStore::load();
        let track = ring_track(6, 200.0, 20.0);
        assert_eq!(track.created_at_ms, 0.0);

        store.save_custom_track(&track).unwrap();
        assert!(store.track_by_id(&track.id).unwrap().created_at_ms > 0.0);
    }

    #[test]
    fn test_broken_track_saved_as_invalid() {
        let mut store = TrackStore::load();
        let mut track = ring_track(6, 200.0, 20.0);
        track.segments[0].width = -5.0;

        store.save_custom_track(&track).unwrap();
        let stored = store.track_by_id(&track.id).unwrap();
        assert_eq!(stored.classification, Classification::Invalid);
        assert!(stored.validation_errors.is_some());
        assert!(!stored.is_race_eligible());
    }

    #[test]
    fn test_track_by_id_misses_gracefully() {
        let store = TrackStore::load();
        assert!(store.track_by_id("no-such-track").is_none());
    }

    #[test]
    fn test_vehicle_catalog_loads_clean() {
        let store = VehicleStore::load();
        assert!(!store.vehicles().is_empty());
        assert_eq!(store.race_ready().count(), store.vehicles().len());

        let first = &store.vehicles()[0];
        assert!(store.vehicle_by_id(&first.id).is_some());
    }
}
