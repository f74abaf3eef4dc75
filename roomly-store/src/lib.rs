//! Store slices: the state containers every Roomly screen subscribes to.
//!
//! A slice owns its state in a `tokio::sync::watch` channel. Each reducer
//! step is a single `send_modify`, so subscribers never observe a half
//! applied update, and slices never touch each other's state.

pub mod detail;
pub mod flow;
pub mod list;
pub mod query;
pub mod resource;
pub mod snapshot;
pub mod state;

pub use detail::{DetailSlot, DetailState};
pub use flow::{Flow, FlowError};
pub use list::{ListState, PagedList};
pub use query::{ListQuery, NoFilters};
pub use resource::{EntityStore, Resource};
pub use snapshot::Snapshots;
pub use state::{RequestState, SyncOutcome};

pub mod prelude {
    //! Re-exports of the most commonly used store types.
    pub use crate::{
        DetailSlot, EntityStore, ListQuery, ListState, PagedList, RequestState, Resource,
        Snapshots, SyncOutcome,
    };
}
