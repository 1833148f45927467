//! Card pagination engine
//!
//! The external API pages backward from the most recent record: each page is
//! newest-first, and the next page is requested with `before` set to the
//! oldest id seen so far. One call here fetches exactly one page and decides
//! whether more remain.

mod cards;

pub use cards::{fetch_card_page, NextPage, PageOutcome};

#[cfg(test)]
mod tests;
