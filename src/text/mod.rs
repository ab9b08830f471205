//! Text preparation utilities
//!
//! This module bounds summary length before tokenization ([`chop`]) and
//! normalizes scraped titles and summaries ([`cleanse`]).

mod chop;
mod cleanse;

pub use chop::ChopPolicy;
pub use cleanse::{cleanse_summary, cleanse_title};
