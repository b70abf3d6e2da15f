use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;

use crate::filter::QueryChain;
use crate::layout::LogLayout;
use crate::scanner::{ScanError, SourceScanner};
use nodescope_types::{Entry, LevelCounts, Source};

/// A node whose log could not be (fully) scanned
#[derive(Debug)]
pub struct SourceFailure {
    pub address: String,
    pub error: ScanError,
}

/// Everything collected from one run, in arrival order
#[derive(Debug, Default)]
pub struct Aggregation {
    pub entries: Vec<Entry>,
    pub failures: Vec<SourceFailure>,
}

/// Scan every source's log concurrently and gather the matching entries
///
/// One task is spawned per source. All tasks share a channel bounded to the
/// number of sources, which is drained while they run. The channel is only
/// closed once every task has finished, so the returned collection is
/// complete. A source that fails is logged and listed in
/// [`Aggregation::failures`]; the other sources are unaffected.
pub async fn aggregate(
    sources: &[Source],
    root: &Path,
    layout: &LogLayout,
    query: QueryChain,
) -> Aggregation {
    let query = Arc::new(query);
    let (tx, mut rx) = mpsc::channel::<Entry>(sources.len().max(1));

    let workers: Vec<_> = sources
        .iter()
        .map(|source| {
            let scanner = SourceScanner::new(
                source.address.as_str(),
                layout.resolve(root, &source.address),
                Arc::clone(&query),
            );
            let tx = tx.clone();
            tokio::spawn(async move { scanner.scan_file(&tx).await })
        })
        .collect();

    let barrier = async move {
        let results = join_all(workers).await;
        // Last sender: closing the channel ends collection
        drop(tx);
        results
    };

    let collect = async {
        let mut entries = Vec::new();
        while let Some(entry) = rx.recv().await {
            entries.push(entry);
        }
        entries
    };

    let (results, entries) = tokio::join!(barrier, collect);

    let mut failures = Vec::new();
    for (source, result) in sources.iter().zip(results) {
        let error = match result {
            Ok(Ok(stats)) => {
                tracing::debug!(node = %source.address, emitted = stats.emitted, "node scanned");
                continue;
            }
            Ok(Err(e)) => e,
            Err(e) => ScanError::Task(e),
        };
        tracing::warn!(node = %source.address, error = %error, "error while processing logs");
        failures.push(SourceFailure {
            address: source.address.clone(),
            error,
        });
    }

    let counts = LevelCounts::from_entries(&entries);
    tracing::info!(
        nodes = sources.len(),
        failed = failures.len(),
        entries = counts.total(),
        error = counts.error,
        warn = counts.warn,
        info = counts.info,
        debug = counts.debug,
        "aggregation complete"
    );

    Aggregation { entries, failures }
}
