//! Store Benchmark Binary
//!
//! Measures insert, sort and clear against the configured PostgreSQL store
//! (or the in-memory store with `--memory`) for tables of 100, 1 000 and
//! 10 000 arrays.
//!
//! Usage:
//!   cargo run -p sortbox-api --release --features bench --bin sortbox-bench -- [all|insert|sort|clear] [--memory]

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use sortbox_api::services::array_service;
use sortbox_api::{ApiError, ApiResult, DbConfig, PgArrayStore};
use sortbox_core::ArrayId;
use sortbox_storage::{ArrayStore, InMemoryArrayStore};
use sortbox_test_utils::random_values;

const TABLE_SIZES: [usize; 3] = [100, 1_000, 10_000];

/// Rows sorted per sort run.
const SORT_SAMPLE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suite {
    All,
    Insert,
    Sort,
    Clear,
}

impl Suite {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Suite::All),
            "insert" => Some(Suite::Insert),
            "sort" => Some(Suite::Sort),
            "clear" => Some(Suite::Clear),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Benchmark failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> ApiResult<()> {
    let mut suite = Suite::All;
    let mut in_memory = false;
    for arg in std::env::args().skip(1) {
        if arg == "--memory" {
            in_memory = true;
            continue;
        }
        suite = Suite::parse(&arg).ok_or_else(|| {
            ApiError::invalid_input(format!(
                "Unknown suite '{}', expected all, insert, sort or clear",
                arg
            ))
        })?;
    }

    let store: Arc<dyn ArrayStore> = if in_memory {
        Arc::new(InMemoryArrayStore::new())
    } else {
        Arc::new(PgArrayStore::connect(&DbConfig::from_env()).await?)
    };
    let store = store.as_ref();

    if matches!(suite, Suite::All | Suite::Insert) {
        println!("\n=== Insert ===");
        for size in TABLE_SIZES {
            insert_run(store, size).await?;
        }
        store.clear().await?;
    }

    if matches!(suite, Suite::All | Suite::Sort) {
        println!("\n=== Sort ===");
        for size in TABLE_SIZES {
            sort_run(store, size).await?;
        }
        store.clear().await?;
    }

    if matches!(suite, Suite::All | Suite::Clear) {
        println!("\n=== Clear ===");
        for size in TABLE_SIZES {
            clear_run(store, size).await?;
        }
    }

    Ok(())
}

async fn fill(store: &dyn ArrayStore, count: usize) -> ApiResult<()> {
    for _ in 0..count {
        store.insert(&random_values(), false).await?;
    }
    Ok(())
}

fn per_item(total: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(n) if n > 0 => total / n,
        _ => Duration::ZERO,
    }
}

async fn insert_run(store: &dyn ArrayStore, count: usize) -> ApiResult<()> {
    println!("\nInserting {} arrays:", count);
    store.clear().await?;

    let start = Instant::now();
    let mut inserted = 0;
    for _ in 0..count {
        match store.insert(&random_values(), false).await {
            Ok(_) => inserted += 1,
            Err(e) => {
                eprintln!("Insert failed: {}", e);
                break;
            }
        }
    }
    let elapsed = start.elapsed();

    println!("Success: {}", inserted == count);
    println!("Total time: {:?}", elapsed);
    println!("Average per array: {:?}", per_item(elapsed, inserted));
    Ok(())
}

async fn sort_run(store: &dyn ArrayStore, table_size: usize) -> ApiResult<()> {
    println!("\nSorting (table of {} arrays):", table_size);
    store.clear().await?;
    fill(store, table_size).await?;

    let mut ids: Vec<ArrayId> = store.list().await?.iter().map(|r| r.id).collect();
    ids.shuffle(&mut rand::rng());
    ids.truncate(SORT_SAMPLE);

    let start = Instant::now();
    let mut processed = 0;
    for id in ids {
        if let Err(e) = array_service::sort_in_place(store, id).await {
            eprintln!("Sort of array {} failed: {}", id, e);
            break;
        }
        processed += 1;
    }
    let elapsed = start.elapsed();

    println!("Success: {}", processed == SORT_SAMPLE.min(table_size));
    println!("Arrays sorted: {}", processed);
    println!("Total time: {:?}", elapsed);
    println!("Average per array: {:?}", per_item(elapsed, processed));
    Ok(())
}

async fn clear_run(store: &dyn ArrayStore, count: usize) -> ApiResult<()> {
    println!("\nClearing {} arrays:", count);
    store.clear().await?;

    let fill_start = Instant::now();
    fill(store, count).await?;
    println!("Filled in: {:?}", fill_start.elapsed());

    let start = Instant::now();
    let result = store.clear().await;
    let elapsed = start.elapsed();

    println!("Success: {}", result.is_ok());
    if let Err(e) = result {
        println!("Error: {}", e);
    }
    println!("Clear time: {:?}", elapsed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_parse() {
        assert_eq!(Suite::parse("all"), Some(Suite::All));
        assert_eq!(Suite::parse("sort"), Some(Suite::Sort));
        assert_eq!(Suite::parse("SORT"), None);
    }

    #[test]
    fn test_per_item() {
        assert_eq!(per_item(Duration::from_millis(100), 10), Duration::from_millis(10));
        assert_eq!(per_item(Duration::from_millis(100), 0), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_sort_run_in_memory() -> ApiResult<()> {
        let store = InMemoryArrayStore::new();
        sort_run(&store, 10).await?;
        assert!(store.list().await?.iter().all(|r| r.is_sorted));
        Ok(())
    }
}
