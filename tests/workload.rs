use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam::channel::bounded;
use insert_strings::{run, Config, Error, EventSink, Item, Report};

const DEADLINE: Duration = Duration::from_secs(10);

#[derive(Default)]
struct Recorder {
    added: Mutex<Vec<Item>>,
    fetched: Mutex<Vec<Item>>,
}

impl EventSink for Recorder {
    fn added(&self, item: &Item) {
        self.added.lock().unwrap().push(item.clone());
    }

    fn fetched(&self, item: &Item) {
        self.fetched.lock().unwrap().push(item.clone());
    }
}

/// Sink whose callbacks fail, standing in for a broken output layer.
struct FailingSink {
    fail_on_add: bool,
}

impl EventSink for FailingSink {
    fn added(&self, _item: &Item) {
        if self.fail_on_add {
            panic!("sink failed on add");
        }
    }

    fn fetched(&self, _item: &Item) {
        if !self.fail_on_add {
            panic!("sink failed on fetch");
        }
    }
}

/// Run on a helper thread and fail the test instead of hanging on deadlock.
fn run_within_deadline<S: EventSink + 'static>(
    config: Config,
    sink: Arc<S>,
) -> insert_strings::Result<Report> {
    let (tx, rx) = bounded(1);
    thread::spawn(move || tx.send(run(&config, sink)).unwrap());
    rx.recv_timeout(DEADLINE)
        .expect("run did not finish before the deadline")
}

fn run_with_deadline(config: Config) -> (Report, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let report = run_within_deadline(config, Arc::clone(&recorder)).unwrap();
    (report, recorder)
}

fn config(capacity: usize, producer_count: usize, target_count: usize) -> Config {
    Config {
        capacity,
        producer_count,
        target_count,
        ..Config::default()
    }
}

#[test]
fn reference_workload_adds_exactly_thirty() {
    let (report, recorder) = run_with_deadline(config(10, 3, 30));
    let added = recorder.added.lock().unwrap();
    let fetched = recorder.fetched.lock().unwrap();

    assert_eq!(report.added, 30);
    assert_eq!(added.len(), 30);
    assert_eq!(report.per_producer.iter().sum::<usize>(), 30);
    assert!(fetched.len() <= 30);

    let mut seqs: Vec<_> = added.iter().map(Item::seq).collect();
    seqs.sort_unstable();
    assert_eq!(seqs, (0..30).collect::<Vec<_>>());

    let distinct: HashSet<_> = fetched.iter().map(Item::seq).collect();
    assert_eq!(distinct.len(), fetched.len());
    assert!(fetched.iter().all(|item| added.contains(item)));
}

#[test]
fn fetched_stream_keeps_each_producers_order() {
    let (_, recorder) = run_with_deadline(config(3, 4, 200));
    let fetched = recorder.fetched.lock().unwrap();

    let mut last_seq: HashMap<usize, usize> = HashMap::new();
    for item in fetched.iter() {
        if let Some(prev) = last_seq.insert(item.producer(), item.seq()) {
            assert!(prev < item.seq(), "producer {} went backwards", item.producer());
        }
    }
}

#[test]
fn minimal_workload_does_not_deadlock() {
    let (report, recorder) = run_with_deadline(config(1, 1, 1));
    assert_eq!(report.added, 1);
    assert_eq!(report.per_producer, vec![1]);
    assert!(report.fetched <= 1);
    assert_eq!(recorder.added.lock().unwrap()[0].producer(), 1);
}

#[test]
fn more_producers_than_permits() {
    let (report, _) = run_with_deadline(config(2, 8, 3));
    assert_eq!(report.added, 3);
    assert_eq!(report.per_producer.len(), 8);
    assert!(report.per_producer.iter().filter(|&&n| n == 0).count() >= 5);
}

#[test]
fn item_text_is_producer_dash_five_digits() {
    let (_, recorder) = run_with_deadline(config(10, 3, 30));
    for item in recorder.added.lock().unwrap().iter() {
        let text = item.to_string();
        let (producer, suffix) = text.split_once('-').unwrap();
        assert_eq!(producer.parse::<usize>().unwrap(), item.producer());
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn consumer_panic_is_reported_without_hanging_producers() {
    let sink = Arc::new(FailingSink { fail_on_add: false });
    let result = run_within_deadline(config(1, 2, 10), sink);
    assert!(matches!(result, Err(Error::Panicked { name }) if name == "consumer"));
}

#[test]
fn producer_panic_is_reported_without_hanging_the_run() {
    let sink = Arc::new(FailingSink { fail_on_add: true });
    let result = run_within_deadline(config(1, 3, 30), sink);
    assert!(matches!(result, Err(Error::Panicked { name }) if name.starts_with("producer-")));
}
