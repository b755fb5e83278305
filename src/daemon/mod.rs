//! Background timer core.
//!
//! This module contains the long-lived side of the focus timer:
//! - `countdown`: repeating tick schedule
//! - `broadcast`: latest-value state broadcast
//! - `timer`: countdown engine with start/pause/stop transitions
//! - `host`: host lifetime and observer attachment

pub mod broadcast;
pub mod countdown;
pub mod error;
pub mod host;
pub mod timer;

pub use broadcast::{StateBroadcaster, StateSubscription};
pub use countdown::Countdown;
pub use error::TimerError;
pub use host::{Attachment, HostId, HostRegistry, TimerHost};
pub use timer::TimerEngine;
