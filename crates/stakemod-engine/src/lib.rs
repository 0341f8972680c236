//! # stakemod-engine
//!
//! Contestation lifecycle and the [`StakedModeration`] facade.
//!
//! ```text
//!   caller ──► StakedModeration ──► StakeLedger        (stake custody)
//!                    │          └─► ContestationEngine (open / vote / close)
//!                    │                   ├─► CertificateVerifier
//!                    │                   └─► SettlementEngine
//!                    └─► EventLog
//! ```
//!
//! Hosts install logging once with [`init_logging`].

pub mod engine;
pub mod event_log;
pub mod logging;
pub mod moderation;
pub mod store;

pub use engine::{ContestationEngine, OpenRequest};
pub use event_log::EventLog;
pub use logging::{LogFormat, init_logging};
pub use moderation::StakedModeration;
pub use store::ContestationStore;
