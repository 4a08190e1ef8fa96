//! Clipper Extract - turning search result pages into records.
//!
//! This crate provides:
//! - [`PageSettler`] for scrolling infinite result lists until they stop growing
//! - Rule tables ([`RuleSet`], [`CategoryRules`]) describing where each field lives
//! - [`ResultParser`] applying a rule table to an HTML document
//! - [`CategoryExtractor`] driving navigation, settling and parsing for one category

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod extractor;
pub mod parser;
pub mod record;
pub mod rules;
pub mod settler;

pub use error::{ExtractError, Result};
pub use extractor::{extractors_for, CategoryExtractor};
pub use parser::ResultParser;
pub use record::{FieldValue, FieldValues, Page, Post, Record, Video};
pub use rules::{CategoryRules, FieldKind, FieldRule, RuleSet, Selection};
pub use settler::PageSettler;
