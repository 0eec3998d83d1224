//! Application state and logic
//!
//! This module contains the core application logic, split into submodules:
//! - `state`: App struct and refresh logic
//! - `sampler`: per-tick process and resource snapshot
//! - `rates`: counter deltas to throughput
//! - `series`: rolling history for the graphs
//! - `gateway`: process actions
//! - `navigation`: list and view movement
//! - `input`: keyboard event handling
//! - `process_ops`, `detail_view`, `affinity`, `startup_view`: dialog flows

mod affinity;
mod cli;
mod detail_view;
mod gateway;
mod input;
mod navigation;
mod process_ops;
mod process_record;
mod rates;
mod sampler;
mod series;
mod sort;
mod startup_view;
mod state;
mod view_mode;

pub use affinity::AffinityDialog;
pub use cli::Args;
pub use detail_view::detail_line_count;
pub use gateway::{ActionGateway, ActionOutcome, PendingKill, ProcessDetails};
pub use input::KeyAction;
pub use process_ops::IoPriorityDialog;
pub use process_record::{ProcessIdentity, ProcessRecord};
pub use rates::{DiskRates, NetRates, RateReport};
pub use sampler::{filter_records, ResourceSnapshot, Sampler, SamplerConfig, TickStage};
pub use series::{SeriesKey, SeriesSet};
pub use sort::{sort_records, SortColumn};
pub use state::App;
pub use view_mode::ViewMode;
