//! In-process hosting for the Sabacc engine.
//!
//! The engine's boundary is a call interface, not a wire protocol: a
//! Presentation Adapter (a chat bot, a console, a test harness) creates
//! tables through [`TableRegistry`], seats players by opaque UUID handles,
//! relays their choices, and renders the returned events. Wall-clock timing
//! also lives on the adapter side, which calls `force_timeout` when the
//! acting player goes quiet.

pub mod registry;
pub mod table;

pub use registry::{TableId, TableRegistry};
pub use table::{LobbyError, StartError, Table, TableError, TurnOutcome};
