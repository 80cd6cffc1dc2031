//! Search → fetch → extract → output, run once per invocation.

use crate::error::Result;
use crate::eutils::EutilsClient;
use crate::extract::{parse_records, PaperRecord, RecordLayout};
use crate::output;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// How stage failures are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// First failure ends the run
    Strict,
    /// Failures are logged and replaced with empty results
    #[default]
    Lenient,
}

/// Where records end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Console,
    Csv(PathBuf),
}

pub struct Pipeline {
    client: EutilsClient,
    layout: RecordLayout,
    policy: ErrorPolicy,
}

impl Pipeline {
    pub fn new(client: EutilsClient, layout: RecordLayout, policy: ErrorPolicy) -> Self {
        Self { client, layout, policy }
    }

    /// Run the search, fetch and extraction stages for `query`
    pub async fn run(&self, query: &str) -> Result<Vec<PaperRecord>> {
        let ids = self.recover("search", self.client.search_ids(query).await)?;
        debug!(ids = ?ids, "Fetched PubMed IDs");

        if ids.is_empty() {
            info!(query = query, "No matching articles");
            return Ok(Vec::new());
        }

        let xml = self.recover("fetch", self.client.fetch_details(&ids).await)?;
        let records = self.recover("extract", parse_records(&xml, self.layout))?;

        info!(requested = ids.len(), extracted = records.len(), "Extraction complete");
        Ok(records)
    }

    /// Print or save `records`
    pub fn emit(&self, records: &[PaperRecord], target: &Output) -> Result<()> {
        let result = match target {
            Output::Console => {
                let mut handle = std::io::stdout().lock();
                output::display_records(&mut handle, records, self.layout)
                    .and_then(|()| handle.flush().map_err(Into::into))
            }
            Output::Csv(path) => output::write_csv(path, records, self.layout).map(|()| {
                println!("Results saved to {}", path.display());
            }),
        };
        self.recover("output", result)
    }

    /// Apply the error policy to a stage result
    fn recover<T: Default>(&self, stage: &str, result: Result<T>) -> Result<T> {
        match (result, self.policy) {
            (Ok(value), _) => Ok(value),
            (Err(e), ErrorPolicy::Strict) => Err(e),
            (Err(e), ErrorPolicy::Lenient) => {
                error!(stage = stage, error = %e, "Stage failed, continuing with empty result");
                Ok(T::default())
            }
        }
    }
}
