//! Text payloads (journal and message bodies).
//!
//! Same envelope mechanics as locations, applied to UTF-8 text. During the hybrid
//! period a stored message carries `encryptedText` + `textVersion` and the plaintext
//! mirror `text_legacy`. The oldest documents only have a bare `text` field.

use super::{non_empty_str, Document, EncryptionCodec};
use crate::constants::{
    FIELD_CLIENT_VERSION, FIELD_ENCRYPTED_TEXT, FIELD_MIGRATION_STATUS, FIELD_TEXT,
    FIELD_TEXT_LEGACY, FIELD_TEXT_VERSION, STATUS_HYBRID_TEXT, STATUS_UNENCRYPTED_TEMP,
    TEMP_UNENCRYPTED_VERSION,
};
use serde_json::Value;
use tracing::{debug, warn};

impl EncryptionCodec {
    /// Seals `text` into an envelope, or `None` on failure.
    pub fn encrypt_text(&self, text: &str) -> Option<String> {
        self.encrypt(text.as_bytes())
    }

    /// Opens an envelope produced by [`encrypt_text`](Self::encrypt_text). Returns `None`
    /// if the envelope does not open or the plaintext is not valid UTF-8.
    pub fn decrypt_text(&self, envelope: &str) -> Option<String> {
        let plaintext = self.decrypt(envelope)?;
        match std::str::from_utf8(&plaintext) {
            Ok(text) => Some(text.to_string()),
            Err(_) => {
                warn!("Decrypted text payload is not valid UTF-8");
                None
            }
        }
    }

    /// Produces the storage fields for a message body.
    ///
    /// With the review kill-switch on, the text is written to `text` with
    /// `textVersion = "1.0-temp"`. Otherwise the result holds `encryptedText`,
    /// `textVersion`, the `text_legacy` mirror and `migrationStatus = "hybrid_text"`.
    /// An empty result means sealing failed.
    pub fn process_message_for_storage(&self, text: &str) -> Document {
        let mut fields = Document::new();

        if self.is_encryption_disabled() {
            debug!("Encryption disabled for review, writing plaintext message");
            fields.insert(FIELD_TEXT.to_string(), Value::from(text));
            fields.insert(
                FIELD_TEXT_VERSION.to_string(),
                Value::from(TEMP_UNENCRYPTED_VERSION),
            );
            fields.insert(
                FIELD_MIGRATION_STATUS.to_string(),
                Value::from(STATUS_UNENCRYPTED_TEMP),
            );
            return fields;
        }

        let Some(envelope) = self.encrypt_text(text) else {
            warn!("Message encryption failed, no fields produced");
            return fields;
        };

        fields.insert(FIELD_ENCRYPTED_TEXT.to_string(), Value::from(envelope));
        fields.insert(
            FIELD_TEXT_VERSION.to_string(),
            Value::from(self.config().format_version.as_str()),
        );
        fields.insert(FIELD_TEXT_LEGACY.to_string(), Value::from(text));
        fields.insert(
            FIELD_MIGRATION_STATUS.to_string(),
            Value::from(STATUS_HYBRID_TEXT),
        );
        fields.insert(
            FIELD_CLIENT_VERSION.to_string(),
            Value::from(self.config().client_version.as_str()),
        );
        fields
    }

    /// Reads a message body from `document`.
    ///
    /// Order of preference: encrypted (`encryptedText` + `textVersion`), then
    /// `text_legacy`, then the bare `text` field. The first readable one wins; empty
    /// legacy fields are skipped.
    pub fn read_message(&self, document: &Document) -> Option<String> {
        if let (Some(envelope), Some(_)) = (
            non_empty_str(document, FIELD_ENCRYPTED_TEXT),
            non_empty_str(document, FIELD_TEXT_VERSION),
        ) {
            if let Some(text) = self.decrypt_text(envelope) {
                return Some(text);
            }
            debug!("Encrypted text unreadable, falling back to legacy fields");
        }

        [FIELD_TEXT_LEGACY, FIELD_TEXT]
            .into_iter()
            .find_map(|field| non_empty_str(document, field))
            .map(str::to_string)
    }
}
