//! `vp-segment` — corridor-level summaries.
//!
//! | Module             | Contents                                              |
//! |--------------------|-------------------------------------------------------|
//! | [`network`]        | network performance rows for the reported runs        |
//! | [`link_segment`]   | link evaluation segments binned by distance           |
//! | [`travel_time`]    | `.rsr` travel-time records, per-run and scenario summaries |
//! | [`occupancy`]      | vehicle occupancy from `.mer` files for person delay  |
//! | [`headway`]        | bus headway statistics from the travel-time records   |
//! | [`stats`]          | NaN-skipping mean, quantile, standard deviation       |
//! | [`error`]          | `SegmentError`, `SegmentResult<T>`                    |

pub mod error;
pub mod headway;
pub mod link_segment;
pub mod network;
pub mod occupancy;
pub mod stats;
pub mod travel_time;

mod cells;


pub use error::{SegmentError, SegmentResult};
pub use headway::{headway_stats, headway_table, HeadwayStats};
pub use link_segment::{link_segment_bins, link_segment_table, LinkMapping, LinkSegmentBin, LinkSegmentConfig, SegmentLabel};
pub use network::{network_performance, NetworkEvalConfig};
pub use occupancy::{assign_persons, load_transit_occupancy, transit_persons, OccupancyConfig, TransitOccupancy};
pub use travel_time::{
    aggregate_scenario, load_runs, records_from_rsr, run_number, summarize_runs, travel_time_report,
    PersonDelay, RunSummary, ScenarioSummary, SegmentLayout, TravelTimeConfig, TravelTimeEval, TravelTimeMapping,
    TravelTimeOutput, TravelTimeRecord, VehicleClass,
};
