/*!
# Love2Love

Core components of the Love2Love service layer: the encryption codec that protects
partner locations and message text stored in the shared document database, and the
two-tier image cache behind profile and journal photos.

## Core Features

- Versioned AES-256-GCM envelopes for coordinates and text
- Hybrid reads that keep pre-encryption documents readable
- A review kill-switch that turns writes into migratable plaintext
- In-place migration of legacy documents
- A memory + disk image cache with byte-bounded LRU eviction
- A widget namespace for images shared with a home-screen widget

## Architecture

- `codec`: `EncryptionCodec` and the stored document shapes
- `crypto`: envelope seal/open and symmetric key providers
- `cache`: `ImageCache`, key derivation, memory and disk tiers
- `config`: Configuration loading and validation
- `errors`: Error handling infrastructure
- `cli`: Command-line interface of the maintenance tool

## Usage Example

```rust,no_run
use love2love::codec::{Coordinate, EncryptionCodec};
use love2love::crypto::KeyringKeyProvider;
use love2love::Config;

fn main() -> love2love::AppResult<()> {
    let config = Config::load()?;
    config.validate()?;

    let keys = KeyringKeyProvider::new(&config.keyring_service);
    let codec = EncryptionCodec::new(config.codec.clone(), &keys)?;

    let fields = codec.write_location(Coordinate::new(48.8566, 2.3522), "partner_location");
    let record = codec.read_location(&fields);
    println!("{:?}", record);
    Ok(())
}
```
*/

/// Two-tier image cache
pub mod cache;
/// Command-line interface for the maintenance tool
pub mod cli;
/// Location and text encryption codec
pub mod codec;
/// Configuration loading and management
pub mod config;
/// Constants used throughout the crate
pub mod constants;
/// Envelope encryption and key providers
pub mod crypto;
/// Error types and utilities for error handling
pub mod errors;

// Re-export important types for convenience
pub use cache::{DecodedImage, ImageCache};
pub use cli::CliArgs;
pub use codec::{Coordinate, Document, EncryptionCodec, LocationRecord};
pub use config::Config;
pub use errors::{AppError, AppResult};
