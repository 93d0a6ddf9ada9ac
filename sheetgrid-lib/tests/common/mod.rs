//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use sheetgrid_lib::PageResult;
use sheetgrid_lib::Query;
use sheetgrid_lib::error::Error;
use sheetgrid_lib::error::SourceError;
use sheetgrid_lib::model::Record;
use sheetgrid_lib::page::select;
use sheetgrid_lib::service::PageSource;
use tokio::sync::Semaphore;

/// Builds `n` records; every third one is in the "Finance" domain.
pub fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let domain = match i % 3 {
                0 => "Finance",
                1 => "Healthcare",
                _ => "Retail",
            };
            Record::new()
                .set("Name", format!("Company {i:05}"))
                .set("Domain", domain)
                .set("Employees", (i * 7 % 500) as i64)
        })
        .collect()
}

/// A page source that counts calls and can be held back or made to fail.
///
/// Call `n` (1-based) serves a dataset of `10 * n` records so tests can tell
/// which fetch produced a value.
pub struct FakeSource {
    calls: AtomicUsize,
    gated: AtomicBool,
    failing: AtomicBool,
    gate: Semaphore,
}

impl FakeSource {
    fn with_gate(gated: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            gated: AtomicBool::new(gated),
            failing: AtomicBool::new(false),
            gate: Semaphore::new(0),
        })
    }

    pub fn new() -> Arc<Self> {
        Self::with_gate(false)
    }

    pub fn gated() -> Arc<Self> {
        Self::with_gate(true)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Lets one held-back fetch proceed, now or whenever it arrives.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PageSource for FakeSource {
    async fn fetch_page(&self, query: &Query) -> Result<PageResult, Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.gated.load(Ordering::SeqCst)
            && let Ok(permit) = self.gate.acquire().await
        {
            permit.forget();
        }
        if self.failing.load(Ordering::SeqCst) || query.filter == "boom" {
            return Err(SourceError::malformed("table missing").into());
        }
        Ok(select(&records(10 * call), query.page, &query.filter))
    }
}

/// A fetcher closure for the cache backed by `source`.
pub fn fetcher(
    source: &Arc<FakeSource>,
    query: &Query,
) -> impl FnOnce() -> BoxFuture<'static, Result<PageResult, Error>> + use<> {
    let source = Arc::clone(source);
    let query = query.clone();
    move || async move { source.fetch_page(&query).await }.boxed()
}
