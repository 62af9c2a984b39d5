// strata: offline-first TTL caching layer with versioned cache generations.
// Fresh entries short-circuit the network; expired entries are never served.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod worker;

pub use cache::{CacheManager, CacheStorage, DiskStorage, MemoryStorage};
pub use clock::{Clock, SystemClock};
pub use config::{DEFAULT_PRECACHE, DEFAULT_TTL, WorkerConfig};
pub use error::{Result, StrataError};
pub use self::http::{Request, RequestKey, Response, ResponseKind};
pub use net::{Fetch, HttpFetcher};
pub use worker::{Clients, NoClients, TS_HEADER, Worker, WorkerState};
