//! Migration of legacy plaintext documents to the hybrid encrypted shape.
//!
//! A document is migrated in place: the encrypted fields are merged in next to the
//! legacy ones, which stay for backward compatibility.

use super::location::read_legacy_location;
use super::{non_empty_str, Document, EncryptionCodec};
use crate::constants::{
    FIELD_ENCRYPTED_LOCATION, FIELD_ENCRYPTED_TEXT, FIELD_LOCATION, FIELD_MIGRATED_AT,
    FIELD_TEXT, FIELD_TEXT_LEGACY,
};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Result of migrating a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Encrypted fields were merged into the document.
    Migrated,
    /// The document needed nothing.
    NotNeeded,
    /// The document needed migration but could not be migrated. It is left untouched.
    Failed,
}

/// Summary of a batch migration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub migrated: usize,
    pub not_needed: usize,
    pub failed: usize,
}

impl MigrationReport {
    fn record(&mut self, outcome: MigrationOutcome) {
        match outcome {
            MigrationOutcome::Migrated => self.migrated += 1,
            MigrationOutcome::NotNeeded => self.not_needed += 1,
            MigrationOutcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.migrated + self.not_needed + self.failed
    }
}

/// A document needs location migration iff it has the legacy `location` field and no
/// `encryptedLocation`.
pub fn needs_migration(document: &Document) -> bool {
    document.contains_key(FIELD_LOCATION) && !document.contains_key(FIELD_ENCRYPTED_LOCATION)
}

/// A document needs text migration iff it only has the bare legacy `text` field.
pub fn needs_text_migration(document: &Document) -> bool {
    non_empty_str(document, FIELD_TEXT).is_some()
        && !document.contains_key(FIELD_ENCRYPTED_TEXT)
        && !document.contains_key(FIELD_TEXT_LEGACY)
}

fn stamp(document: &mut Document) {
    document.insert(
        FIELD_MIGRATED_AT.to_string(),
        Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
}

impl EncryptionCodec {
    /// Migrates the location of a legacy document in place.
    ///
    /// The encrypted shape is re-derived from the legacy coordinates and merged into the
    /// document together with a `migratedAt` timestamp. The legacy `location` field is
    /// kept. While the review kill-switch is on, migration cannot produce encrypted
    /// fields and reports `Failed`.
    pub fn migrate_entry(&self, document: &mut Document) -> MigrationOutcome {
        if !needs_migration(document) {
            return MigrationOutcome::NotNeeded;
        }

        if self.is_encryption_disabled() {
            debug!("Skipping migration while encryption is disabled for review");
            return MigrationOutcome::Failed;
        }

        let Some(legacy) = read_legacy_location(document) else {
            warn!("Legacy location field is malformed, cannot migrate");
            return MigrationOutcome::Failed;
        };

        let fields = self.write_location(legacy.coordinate(), "migration");
        if fields.is_empty() {
            return MigrationOutcome::Failed;
        }

        document.extend(fields);
        stamp(document);
        MigrationOutcome::Migrated
    }

    /// Migrates the message body of a document that only has a bare `text` field.
    ///
    /// The bare `text` field is kept next to the new encrypted fields.
    pub fn migrate_message(&self, document: &mut Document) -> MigrationOutcome {
        if !needs_text_migration(document) {
            return MigrationOutcome::NotNeeded;
        }

        if self.is_encryption_disabled() {
            debug!("Skipping message migration while encryption is disabled for review");
            return MigrationOutcome::Failed;
        }

        let Some(text) = non_empty_str(document, FIELD_TEXT).map(str::to_string) else {
            return MigrationOutcome::Failed;
        };

        let fields = self.process_message_for_storage(&text);
        if fields.is_empty() {
            return MigrationOutcome::Failed;
        }

        document.extend(fields);
        stamp(document);
        MigrationOutcome::Migrated
    }

    /// Migrates the locations of a batch of documents, continuing past failures.
    pub fn migrate_entries(&self, documents: &mut [Document]) -> MigrationReport {
        let mut report = MigrationReport::default();

        for document in documents.iter_mut() {
            report.record(self.migrate_entry(document));
        }

        info!(
            migrated = report.migrated,
            not_needed = report.not_needed,
            failed = report.failed,
            "Location migration finished"
        );
        report
    }
}
