//! Trip dashboard pipeline
//!
//! Request construction, bounded fetching, slot rendering and the session
//! state that ties user actions to loads.

pub mod orchestrator;
pub mod render;
pub mod request;
pub mod session;
pub mod types;

pub use orchestrator::{Dashboard, DashboardOptions, LoadOutcome};
pub use render::{DashboardSurface, RenderSink, SlotUpdate};
pub use session::{SessionState, UserAction};
pub use types::{FilterCriteria, FilterField, Pagination, TripRecord, TripsPage};
