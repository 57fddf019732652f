//! Daily feed digest: fetches RSS/Atom feeds, keeps recent entries, and
//! writes a JSON digest or a markdown insight report.

pub mod config;
pub mod feed;
pub mod output;
pub mod util;
