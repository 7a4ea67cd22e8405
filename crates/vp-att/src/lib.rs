//! `vp-att` — reading simulator exports and analyst mapping sheets.
//!
//! # Crate layout
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`att`]       | `load_att_path`, `load_att_reader` (evaluation exports) |
//! | [`rsr`]       | `load_rsr_path`, `load_rsr_reader` (raw travel times)  |
//! | [`mer`]       | `load_mer_path`, `load_mer_reader` (data-collection raw output) |
//! | [`workbook`]  | `MappingWorkbook` — named sheets of a spreadsheet or CSV directory |
//! | [`error`]     | `LoadError`, `LoadResult<T>`                           |
//!
//! # Attribute file format
//!
//! ```text
//! $VISION
//! * File: C:\...\Tobin Bridge Base Model.inpx
//! * Table: Movement Results
//! *
//! $MOVEMENTEVALUATION:SIMRUN;TIMEINT;MOVEMENT;MOVEMENT\DIRECTION;...
//! AVG;2700-6300;101: Link5 @ Link9;N-S;...
//! ```
//!
//! The first line is always skipped.  It cannot be handled as a comment
//! because `*` is the only comment prefix the delimited reader supports.
//! The `$`-prefixed line that follows the comments is the header.

pub mod att;
pub mod error;
pub mod mer;
pub mod rsr;
pub mod workbook;

mod delimited;


pub use att::{load_att_path, load_att_reader};
pub use error::{LoadError, LoadResult};
pub use mer::{load_mer_path, load_mer_reader};
pub use rsr::{load_rsr_path, load_rsr_reader};
pub use workbook::MappingWorkbook;
