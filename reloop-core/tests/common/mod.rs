#![allow(dead_code)]

use futures::future;
use futures::FutureExt;
use reloop_core::{Context, Dispatcher, LoopConfig, ManualScheduler};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tokio::runtime::{Builder, Runtime};

pub fn runtime() -> Runtime {
    Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("tokio runtime")
}

pub fn act(kind: &str) -> Value {
    json!({ "type": kind })
}

/// Context whose dispatch only records what it receives.
pub struct Recording {
    pub ctx: Context<u32, Value>,
    pub dispatched: Rc<RefCell<Vec<Value>>>,
    pub scheduler: ManualScheduler,
}

pub fn recording_with(state: u32, config: LoopConfig) -> Recording {
    let dispatched = Rc::new(RefCell::new(Vec::new()));
    let log = dispatched.clone();
    let dispatch: Dispatcher<Value> = Rc::new(move |action| {
        log.borrow_mut().push(action);
        future::ready(Ok(())).boxed_local()
    });
    let scheduler = ManualScheduler::new();
    let ctx = Context::new(dispatch, Rc::new(move || state), Rc::new(scheduler.clone()), config);
    Recording {
        ctx,
        dispatched,
        scheduler,
    }
}

pub fn recording() -> Recording {
    recording_with(0, LoopConfig::default())
}

#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber writing into the returned buffer.
pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, logs.contents())
}
