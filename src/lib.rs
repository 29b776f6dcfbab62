//! # jobwatch-core
//!
//! Core engine for a job-notification subscription bot: the stateful
//! machinery between a chat transport and durable storage.
//!
//! ## Architecture
//!
//! - **Cache-aside accessor**: read-through caching over the relational
//!   Record Store with explicit invalidation after writes ([`accessor`])
//! - **Selection wizard**: a finite-state-machine session engine driving the
//!   paginated multi-select flows for directions, promo codes, and plans
//!   ([`wizard`], [`session`])
//! - **Redemption guard**: at-most-once-per-user and max-uses enforcement
//!   for promo codes ([`redemption`])
//! - **Search toggle** and **subscription status** read sides ([`search`],
//!   [`subscription`])
//!
//! The transport layer is out of scope: inbound actions arrive as structured
//! tokens, outbound responses leave as [`wizard::RenderInstruction`] values.

pub mod accessor;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod redemption;
pub mod search;
pub mod session;
pub mod store;
pub mod subscription;
pub mod wizard;

pub use accessor::CacheAside;
pub use config::CoreConfig;
pub use error::{CoreError, Result};
pub use redemption::{RedemptionGuard, RedemptionOutcome};
pub use search::{SearchService, SearchStart};
pub use subscription::{SubscriptionService, SubscriptionStatus};
pub use wizard::{ActionInput, RenderInstruction, WizardEngine};
