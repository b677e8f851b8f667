//! Composite progress notifier: delegates to multiple notifiers.
//!
//! Used to fan out run events to both the terminal display and the JSONL
//! event log at the same time.

use super::progress::QueryProgressNotifier;
use consensus_domain::ModelResponse;

/// A progress notifier that delegates to multiple inner notifiers.
///
/// Uses borrowed references with a lifetime parameter so both owned and
/// borrowed notifiers can be composed without wrapper types.
pub struct CompositeProgress<'a> {
    delegates: Vec<&'a dyn QueryProgressNotifier>,
}

impl<'a> CompositeProgress<'a> {
    pub fn new(delegates: Vec<&'a dyn QueryProgressNotifier>) -> Self {
        Self { delegates }
    }

    pub fn push(&mut self, delegate: &'a dyn QueryProgressNotifier) {
        self.delegates.push(delegate);
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

/// Macro to delegate a method call to all inner notifiers.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        for d in &$self.delegates {
            d.$method($($arg),*);
        }
    };
}

impl QueryProgressNotifier for CompositeProgress<'_> {
    fn on_model_start(&self, model: &str) {
        delegate!(self, on_model_start, model);
    }

    fn on_model_stream(&self, model: &str, chunk: &str) {
        delegate!(self, on_model_stream, model, chunk);
    }

    fn on_model_complete(&self, model: &str, response: &ModelResponse) {
        delegate!(self, on_model_complete, model, response);
    }

    fn on_model_error(&self, model: &str, error: &str) {
        delegate!(self, on_model_error, model, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl QueryProgressNotifier for Recorder {
        fn on_model_start(&self, model: &str) {
            self.events.lock().unwrap().push(format!("start:{model}"));
        }

        fn on_model_stream(&self, model: &str, chunk: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("stream:{model}:{chunk}"));
        }

        fn on_model_error(&self, model: &str, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error:{model}:{error}"));
        }
    }

    #[test]
    fn test_events_reach_every_delegate() {
        let first = Recorder::default();
        let second = Recorder::default();
        let composite = CompositeProgress::new(vec![&first, &second]);

        composite.on_model_start("a");
        composite.on_model_stream("a", "hi");
        composite.on_model_complete("a", &ModelResponse::new("a", "hi", "test"));
        composite.on_model_error("b", "boom");

        let expected = vec![
            "start:a".to_string(),
            "stream:a:hi".to_string(),
            "error:b:boom".to_string(),
        ];
        assert_eq!(*first.events.lock().unwrap(), expected);
        assert_eq!(*second.events.lock().unwrap(), expected);
    }

    #[test]
    fn test_push_and_is_empty() {
        let recorder = Recorder::default();
        let mut composite = CompositeProgress::new(Vec::new());
        assert!(composite.is_empty());
        composite.push(&recorder);
        assert!(!composite.is_empty());
    }
}
