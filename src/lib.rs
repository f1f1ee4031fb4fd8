//! Keyword search over generated documentation indices, served over MCP.

pub mod config;
pub mod entry;
pub mod error;
pub mod loader;
pub mod logging;
pub mod partition;
pub mod search;
pub mod server;
pub mod state;
pub mod store;
pub mod tools;

pub use config::Config;
pub use entry::{IndexEntry, RawEntry, Target};
pub use error::{IndexError, Result};
pub use loader::{discover, load_all, load_all_with_timeout};
pub use partition::{IndexPartition, PartitionKey, PartitionSource};
pub use search::{Matches, Query, SearchMode, search, suggest};
pub use server::DocSearchServer;
pub use state::{IndexState, LoadedIndex};
pub use store::{EntryStore, LoadSummary, SearchIndex};
