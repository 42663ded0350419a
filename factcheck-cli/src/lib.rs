//! # factcheck-cli
//!
//! The `factcheck` binary: reads an article and reference URLs, builds an
//! evidence corpus, verifies each sentence and prints a report.
//!
//! ```text
//! factcheck --article post.txt -u https://en.wikipedia.org/wiki/Large_language_model
//! cat post.txt | factcheck --url-file refs.txt --format json
//! ```

pub mod cli;
pub mod report;
pub mod run;

pub use cli::{Cli, OutputFormat};
pub use run::run;
