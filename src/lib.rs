//! # pubmed-papers
//!
//! Fetch PubMed papers for a query and flag authors with non-academic affiliations.
//!
//! ## Modules
//!
//! - [`eutils`] - NCBI E-utilities client (esearch + efetch)
//! - [`extract`] - Record extraction from EFetch XML
//! - [`output`] - Console display and CSV files
//! - [`pipeline`] - Stage orchestration and error policy
//! - [`config`] - Client settings
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pubmed_papers::{config::Config, eutils::EutilsClient, extract};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = EutilsClient::new(Config::default())?;
//!     let ids = client.search_ids("cancer immunotherapy 2023").await?;
//!     let xml = client.fetch_details(&ids).await?;
//!     let records = extract::parse_records(&xml, extract::RecordLayout::Full)?;
//!     println!("Found {} papers", records.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod eutils;
pub mod extract;
pub mod output;
pub mod pipeline;

pub use error::{PubmedError, Result};
pub use extract::{PaperRecord, RecordLayout};
