//! # AMS Core
//!
//! Mobility-aware context ownership for the Application Mobility Service.
//!
//! ```text
//! ams-core/src/
//! ├── topology/       # TopologyView + graph built from a scenario description
//! ├── resolver.rs     # Preferred-node rankings per attachment point
//! ├── tracker.rs      # Device context ownership decisions
//! ├── dispatcher.rs   # Subscription matching and notification payloads
//! ├── queue.rs        # Bounded delivery queue with counters
//! ├── subscriptions.rs# Subscription registry
//! ├── store/          # KvStore abstraction, memory and SQLite backends, ordered writer
//! ├── events.rs       # Lifecycle events and the event loop
//! └── service/        # AmsService: all state behind one lock
//! ```
//!
//! Event flow: a topology change refreshes rankings, device rankings are
//! updated, and each affected application is reconciled. Ownership changes
//! produce notifications that are queued once the lock is released.

#![cfg_attr(test, allow(clippy::panic, clippy::assertions_on_result_states))]

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod queue;
pub mod resolver;
pub mod service;
pub mod state;
pub mod store;
pub mod subscriptions;
pub mod topology;
pub mod tracker;

pub use error::{CoreError, CoreResult};
pub use events::{event_channel, run_event_loop, AmsEvent, EventReceiver, EventSender};
pub use queue::{DeliveryStats, NotificationQueue, OutboundNotification};
pub use resolver::{PreferredNodeResolver, RankingMap};
pub use service::{AmsService, RestoreSummary};
pub use store::{KvStore, MemoryStore, SqliteStore, StoreError, StoreKeys, StoreWriter};
pub use topology::{DeviceLocation, ScenarioTopology, TopologyView};
