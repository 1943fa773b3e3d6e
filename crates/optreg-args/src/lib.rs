//! Command-line arguments into stores.
//!
//! [`ArgsParser`] turns a [`StoreDefinition`] into a `clap` command: boolean
//! keys become switches, keys with a codec take one value decoded through
//! that codec; [`ArgsParser::map_values`] maps a flag taking several values.
//! Parsing yields a [`Store`] holding only the flags that were
//! given; everything else falls back to key defaults as usual.
//!
//! ```rust
//! use optreg_args::{ArgsParser, ParseOutcome};
//! use optreg_store::{display_codec, Key, StoreDefinition};
//!
//! let jobs: Key<u32> = Key::new("jobs").with_codec(display_codec());
//! let definition = StoreDefinition::builder("build").key(&jobs).build().unwrap();
//!
//! let parser = ArgsParser::new(definition).unwrap();
//! match parser.parse(["--jobs", "4"]).unwrap() {
//!     ParseOutcome::Parsed(store) => assert_eq!(store.get(&jobs).unwrap(), 4),
//!     ParseOutcome::Help(_) => unreachable!(),
//! }
//! ```
//!
//! [`StoreDefinition`]: optreg_store::StoreDefinition
//! [`Store`]: optreg_store::Store

pub mod config;
pub mod error;
pub mod parser;

pub use config::ArgsConfig;
pub use error::{ArgsError, ArgsResult};
pub use parser::{ArgsParser, ParseOutcome};
