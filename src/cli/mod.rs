//! Command-line interface of the `love2love` maintenance tool.

use crate::constants::{APP_DESCRIPTION, APP_NAME};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Maintenance tool for the Love2Love encryption codec and image cache
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Print verbose output
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Show the memory budget and disk usage of the image cache
    CacheReport,

    /// Remove every cached image from memory and disk
    CacheClear,

    /// Print the storage fields for a coordinate pair as JSON
    SealLocation {
        /// Latitude in decimal degrees
        #[clap(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[clap(long, allow_hyphen_values = true)]
        lon: f64,

        /// Feature name recorded in logs
        #[clap(long, default_value = "cli")]
        context: String,
    },

    /// Decode the location of a stored JSON document
    ReadLocation {
        /// Path to a JSON object
        file: PathBuf,
    },

    /// Migrate a JSON array of documents to the encrypted location shape
    Migrate {
        /// Path to a JSON array of objects
        file: PathBuf,

        /// Write the migrated documents back to FILE instead of stdout
        #[clap(long)]
        in_place: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_commands() {
        let args = CliArgs::parse_from(["love2love", "cache-report"]);
        assert_eq!(args.command, Command::CacheReport);
        assert!(!args.verbose);

        let args = CliArgs::parse_from(["love2love", "cache-clear", "--verbose"]);
        assert_eq!(args.command, Command::CacheClear);
        assert!(args.verbose);
    }

    #[test]
    fn test_seal_location_accepts_negative_coordinates() {
        let args =
            CliArgs::parse_from(["love2love", "seal-location", "--lat", "-33.86", "--lon", "-70.5"]);
        assert_eq!(
            args.command,
            Command::SealLocation {
                lat: -33.86,
                lon: -70.5,
                context: "cli".to_string()
            }
        );
    }

    #[test]
    fn test_migrate_flags() {
        let args = CliArgs::parse_from(["love2love", "migrate", "docs.json", "--in-place"]);
        assert_eq!(
            args.command,
            Command::Migrate {
                file: PathBuf::from("docs.json"),
                in_place: true
            }
        );
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(CliArgs::try_parse_from(["love2love"]).is_err());
        assert!(CliArgs::try_parse_from(["love2love", "seal-location", "--lat", "1"]).is_err());
    }
}
