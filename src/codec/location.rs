//! Location payloads.
//!
//! Encrypted shape: `encryptedLocation` holds the envelope of the `"lat,lon"` string
//! and `locationVersion` its format version. For the transition period every encrypted
//! write also carries the legacy `location: {latitude, longitude}` mirror.

use super::{non_empty_str, Document, EncryptionCodec};
use crate::constants::{
    FIELD_CLIENT_VERSION, FIELD_ENCRYPTED_LOCATION, FIELD_HAS_LOCATION, FIELD_LATITUDE,
    FIELD_LOCATION, FIELD_LOCATION_VERSION, FIELD_LONGITUDE, FIELD_MIGRATION_STATUS,
    LEGACY_FORMAT_VERSION, STATUS_HYBRID, STATUS_UNENCRYPTED_TEMP, TEMP_UNENCRYPTED_VERSION,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info_span, warn};

/// A geographic coordinate pair to be stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// The `"lat,lon"` plaintext form. `f64`'s `Display` is the shortest string that
    /// parses back to the same value, so the round-trip is exact.
    fn to_payload(self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    fn from_payload(payload: &str) -> Option<Self> {
        let mut parts = payload.split(',');
        let latitude = parts.next()?.trim().parse::<f64>().ok()?;
        let longitude = parts.next()?.trim().parse::<f64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(latitude, longitude))
    }

    fn legacy_value(self) -> Value {
        json!({
            FIELD_LATITUDE: self.latitude,
            FIELD_LONGITUDE: self.longitude,
        })
    }
}

/// A decoded location, as read back from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub is_encrypted: bool,
    pub format_version: String,
}

impl LocationRecord {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl EncryptionCodec {
    /// Produces the storage fields for `location`.
    ///
    /// With the review kill-switch on, the legacy plaintext shape is emitted with
    /// `locationVersion = "1.0-temp"` and no encryption happens. Otherwise the result
    /// holds the encrypted fields, the legacy mirror, `migrationStatus = "hybrid"` and the
    /// client version. If sealing fails the result is empty and the caller must treat
    /// the write as failed.
    ///
    /// `context` names the calling feature and only appears in logs.
    pub fn write_location(&self, location: Coordinate, context: &str) -> Document {
        let _span = info_span!("write_location", context).entered();

        if !location.is_finite() {
            warn!("Refusing to store a non-finite coordinate");
            return Document::new();
        }

        let mut fields = Document::new();

        if self.is_encryption_disabled() {
            debug!("Encryption disabled for review, writing plaintext location");
            fields.insert(FIELD_LOCATION.to_string(), location.legacy_value());
            fields.insert(
                FIELD_LOCATION_VERSION.to_string(),
                Value::from(TEMP_UNENCRYPTED_VERSION),
            );
            fields.insert(FIELD_HAS_LOCATION.to_string(), Value::Bool(true));
            fields.insert(
                FIELD_MIGRATION_STATUS.to_string(),
                Value::from(STATUS_UNENCRYPTED_TEMP),
            );
            return fields;
        }

        let Some(envelope) = self.encrypt(location.to_payload().as_bytes()) else {
            warn!("Location encryption failed, no fields produced");
            return Document::new();
        };

        fields.insert(FIELD_ENCRYPTED_LOCATION.to_string(), Value::from(envelope));
        fields.insert(
            FIELD_LOCATION_VERSION.to_string(),
            Value::from(self.config().format_version.as_str()),
        );
        fields.insert(FIELD_HAS_LOCATION.to_string(), Value::Bool(true));
        fields.insert(FIELD_LOCATION.to_string(), location.legacy_value());
        fields.insert(FIELD_MIGRATION_STATUS.to_string(), Value::from(STATUS_HYBRID));
        fields.insert(
            FIELD_CLIENT_VERSION.to_string(),
            Value::from(self.config().client_version.as_str()),
        );
        fields
    }

    /// Reads a location from `document`, preferring the encrypted fields.
    ///
    /// The legacy `location` object is used only when the encrypted fields are missing
    /// or fail to decode; the result is then tagged unencrypted with version "1.0".
    pub fn read_location(&self, document: &Document) -> Option<LocationRecord> {
        if let Some(record) = self.read_encrypted_location(document) {
            return Some(record);
        }

        let legacy = read_legacy_location(document);
        if legacy.is_none() && document.contains_key(FIELD_ENCRYPTED_LOCATION) {
            debug!("Encrypted location unreadable and no legacy mirror present");
        }
        legacy
    }

    fn read_encrypted_location(&self, document: &Document) -> Option<LocationRecord> {
        let envelope = non_empty_str(document, FIELD_ENCRYPTED_LOCATION)?;
        let version = non_empty_str(document, FIELD_LOCATION_VERSION)?;

        let plaintext = self.decrypt(envelope)?;
        let payload = std::str::from_utf8(&plaintext).ok()?;

        let Some(coordinate) = Coordinate::from_payload(payload) else {
            warn!("Decrypted location payload is not a coordinate pair");
            return None;
        };

        Some(LocationRecord {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            is_encrypted: true,
            format_version: version.to_string(),
        })
    }
}

pub(crate) fn read_legacy_location(document: &Document) -> Option<LocationRecord> {
    let location = document.get(FIELD_LOCATION)?.as_object()?;
    let latitude = location.get(FIELD_LATITUDE)?.as_f64()?;
    let longitude = location.get(FIELD_LONGITUDE)?.as_f64()?;

    Some(LocationRecord {
        latitude,
        longitude,
        is_encrypted: false,
        format_version: LEGACY_FORMAT_VERSION.to_string(),
    })
}
