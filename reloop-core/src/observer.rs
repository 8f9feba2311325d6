use crate::Observation;
use std::fmt::Debug;
use std::sync::Arc;

/// Observer function type
pub type ObserverFn<A> = Arc<dyn Fn(&Observation<A>) + Send + Sync>;

/// No-op observer
pub fn no_op_observer<A: 'static>() -> ObserverFn<A> {
    Arc::new(|_observation: &Observation<A>| {})
}

/// Tracing observer - logs to tracing crate
pub fn tracing_observer<A: Debug + 'static>() -> ObserverFn<A> {
    Arc::new(move |observation: &Observation<A>| match observation {
        Observation::Dispatch { data, .. } => {
            tracing::info!(target: "reloop-core::Msg", "Msg({:?})", data);
        }
        Observation::Effect { data, .. } => {
            tracing::debug!(target: "reloop-core::Cmd", "Cmd({:?})", data);
        }
    })
}

/// Filter observer - include/exclude kinds
pub fn filter_observer<A: 'static>(
    wrapped: ObserverFn<A>,
    include_dispatches: bool,
    include_effects: bool,
) -> ObserverFn<A> {
    Arc::new(move |observation: &Observation<A>| {
        let should_pass = match observation {
            Observation::Dispatch { .. } => include_dispatches,
            Observation::Effect { .. } => include_effects,
        };

        if should_pass {
            wrapped(observation);
        }
    })
}

/// Filter observer with custom predicate
pub fn filter_with<A, F>(wrapped: ObserverFn<A>, predicate: F) -> ObserverFn<A>
where
    A: 'static,
    F: Fn(&Observation<A>) -> bool + Send + Sync + 'static,
{
    Arc::new(move |observation: &Observation<A>| {
        if predicate(observation) {
            wrapped(observation);
        }
    })
}

/// Tee observer - call multiple observers
pub fn tee_observer<A: 'static>(observers: Vec<ObserverFn<A>>) -> ObserverFn<A> {
    Arc::new(move |observation: &Observation<A>| {
        for observer in &observers {
            observer(observation);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CmdKind;
    use std::sync::Mutex;
    use std::time::SystemTime;

    fn recording(seen: &Arc<Mutex<Vec<String>>>, label: &'static str) -> ObserverFn<u8> {
        let seen = Arc::clone(seen);
        Arc::new(move |observation: &Observation<u8>| {
            let entry = match observation {
                Observation::Dispatch { data, .. } => format!("{label}:dispatch:{data}"),
                Observation::Effect { data, .. } => format!("{label}:effect:{data:?}"),
            };
            seen.lock().unwrap().push(entry);
        })
    }

    fn dispatch(data: u8) -> Observation<u8> {
        Observation::Dispatch {
            ts: SystemTime::now(),
            data,
        }
    }

    fn effect(data: CmdKind) -> Observation<u8> {
        Observation::Effect {
            ts: SystemTime::now(),
            data,
        }
    }

    #[test]
    fn filter_drops_excluded_kinds() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let observer = filter_observer(recording(&seen, "a"), true, false);
        observer(&dispatch(1));
        observer(&effect(CmdKind::Run));
        assert_eq!(*seen.lock().unwrap(), vec!["a:dispatch:1"]);
    }

    #[test]
    fn filter_with_uses_predicate() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let observer = filter_with(recording(&seen, "a"), |observation| {
            matches!(observation, Observation::Dispatch { data, .. } if *data > 1)
        });
        observer(&dispatch(1));
        observer(&dispatch(2));
        assert_eq!(*seen.lock().unwrap(), vec!["a:dispatch:2"]);
    }

    #[test]
    fn tee_calls_every_observer_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let observer = tee_observer(vec![
            recording(&seen, "a"),
            no_op_observer(),
            recording(&seen, "b"),
        ]);
        observer(&effect(CmdKind::List));
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["a:effect:List", "b:effect:List"]
        );
    }
}
