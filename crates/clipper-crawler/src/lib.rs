//! Clipper Crawler - the crawl loop.
//!
//! [`CrawlDriver`] authenticates once, pulls the rotated term list, and for
//! each term opens a fresh tab, runs every category extractor in priority
//! order and hands the records to the sink. Only an authentication failure
//! stops a run early.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod driver;
pub mod error;
pub mod report;

pub use driver::CrawlDriver;
pub use error::{CrawlError, Result};
pub use report::{RunReport, TermReport};
