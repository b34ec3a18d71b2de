//! Wiring for the producer/consumer run: spawn, join, cancel, report.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info};

use crate::buffer::BoundedBuffer;
use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::{Error, Result};
use crate::item::Item;

/// Receives one event per successful deposit and per successful fetch.
pub trait EventSink: Send + Sync {
    fn added(&self, item: &Item);
    fn fetched(&self, item: &Item);
}

/// Prints the console protocol lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl EventSink for Stdout {
    fn added(&self, item: &Item) {
        println!("{item} has been added to the buffer");
    }

    fn fetched(&self, item: &Item) {
        println!("{item} fetched from the buffer");
    }
}

/// Counts gathered from a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub added: usize,
    pub fetched: usize,
    /// Successful deposits per producer, indexed by producer id - 1.
    pub per_producer: Vec<usize>,
}

/// Run the workload described by `config` to completion.
///
/// Producers run until the coordinator is exhausted. Once every producer
/// has been joined the consumer is cancelled, so items still in the buffer
/// at that point are left unconsumed.
pub fn run(config: &Config, sink: Arc<dyn EventSink>) -> Result<Report> {
    config.validate()?;

    let buffer = BoundedBuffer::new(config.capacity)?;
    let coordinator = Arc::new(Coordinator::new(config.target_count)?);
    let token = CancellationToken::new();
    info!(
        "starting run: capacity={}, target={}, producers={}",
        config.capacity, config.target_count, config.producer_count
    );

    let consumer = spawn("consumer".to_string(), {
        let buffer = buffer.clone();
        let token = token.clone();
        let sink = Arc::clone(&sink);
        move || consume(&buffer, &token, sink.as_ref())
    })?;

    let mut producers = Vec::with_capacity(config.producer_count);
    for id in 1..=config.producer_count {
        let name = format!("producer-{id}");
        let spawned = spawn(name, {
            let buffer = buffer.clone();
            let coordinator = Arc::clone(&coordinator);
            let token = token.clone();
            let sink = Arc::clone(&sink);
            move || produce(id, &buffer, &coordinator, &token, sink.as_ref())
        });
        match spawned {
            Ok(handle) => producers.push(handle),
            Err(err) => {
                token.cancel();
                let _ = join_all(producers);
                let _ = join(consumer);
                return Err(err);
            }
        }
    }

    let per_producer = join_all(producers);
    debug!("all producers joined, cancelling consumer");
    token.cancel();
    let fetched = join(consumer);

    let per_producer = per_producer?;
    let fetched = fetched?;
    let added: usize = per_producer.iter().sum();
    info!("run finished: {added} added, {fetched} fetched");
    Ok(Report {
        added,
        fetched,
        per_producer,
    })
}

fn produce(
    id: usize,
    buffer: &BoundedBuffer<Item>,
    coordinator: &Coordinator,
    token: &CancellationToken,
    sink: &dyn EventSink,
) -> usize {
    let _guard = token.cancel_on_panic();
    let mut rng = rand::thread_rng();
    let mut deposited = 0;
    while !token.is_cancelled() {
        let Some(seq) = coordinator.claim_next() else {
            debug!("no permits left after {deposited} deposit(s)");
            break;
        };
        let item = Item::random(id, seq, &mut rng);
        if buffer.deposit(item.clone(), token).is_err() {
            debug!("cancelled while depositing {item}");
            break;
        }
        sink.added(&item);
        deposited += 1;
    }
    deposited
}

fn consume(buffer: &BoundedBuffer<Item>, token: &CancellationToken, sink: &dyn EventSink) -> usize {
    let _guard = token.cancel_on_panic();
    let mut fetched = 0;
    while !token.is_cancelled() {
        match buffer.fetch(token) {
            Ok(item) => {
                sink.fetched(&item);
                fetched += 1;
            }
            Err(_) => break,
        }
    }
    debug!("consumer stopping after {fetched} fetch(es), {} left in buffer", buffer.len());
    fetched
}

fn spawn<F>(name: String, f: F) -> Result<(String, JoinHandle<usize>)>
where
    F: FnOnce() -> usize + Send + 'static,
{
    match thread::Builder::new().name(name.clone()).spawn(f) {
        Ok(handle) => Ok((name, handle)),
        Err(source) => Err(Error::spawn(name, source)),
    }
}

fn join((name, handle): (String, JoinHandle<usize>)) -> Result<usize> {
    handle.join().map_err(|_| Error::panicked(name))
}

// Joins every handle even after a failure so no thread outlives the run.
fn join_all(handles: Vec<(String, JoinHandle<usize>)>) -> Result<Vec<usize>> {
    let mut counts = Vec::with_capacity(handles.len());
    let mut first_err = None;
    for handle in handles {
        match join(handle) {
            Ok(count) => counts.push(count),
            Err(err) => {
                first_err.get_or_insert(err);
            }
        }
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(counts),
    }
}
