//! Passive viewer client: polls the listing endpoint on a fixed cadence and
//! reconciles what the screen should show, with push events as an early-wakeup
//! fast path. Polling is the guaranteed path; pushes only make it faster.

pub mod poller;
pub mod reconciler;
