//! Clipper Delivery - forwarding records downstream.
//!
//! Every record is POSTed on its own as `{"type": <category>, "data": <record>}`.
//! Transient failures are retried with capped exponential backoff inside the
//! sink; whatever happens, [`RecordSink::deliver`] reports an outcome instead
//! of an error so the crawl never stops on a delivery problem.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod sink;

pub use error::{DeliveryError, Result};
pub use sink::{backoff_delay, DeliveryOutcome, DeliverySink, RecordSink};
