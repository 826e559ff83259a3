use crate::client::{HintSource, request_hint};
use crate::hint::{Hint, THEMES};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

/// Runs hint requests off the frame thread.
///
/// Each request gets a generation number; only the newest outstanding request
/// may update the current hint; answers to superseded requests are dropped.
pub struct AdviceService {
    source: Arc<dyn HintSource>,
    tx: Sender<(u64, Hint)>,
    rx: Receiver<(u64, Hint)>,
    generation: u64,
    pending: Option<u64>,
    current: Option<Hint>,
    next_theme: usize,
    discarded: u64,
}

impl AdviceService {
    pub fn new(source: Arc<dyn HintSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            tx,
            rx,
            generation: 0,
            pending: None,
            current: None,
            next_theme: 0,
            discarded: 0,
        }
    }

    /// Start a request for `theme`, superseding any in flight.
    pub fn request(&mut self, theme: &str) {
        self.generation += 1;
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let theme = theme.to_string();
        tracing::debug!(%theme, generation, "advice requested");
        std::thread::spawn(move || {
            // A panicking source must still answer, or the request stays loading.
            let fetch = AssertUnwindSafe(|| request_hint(source.as_ref(), &theme));
            let hint = panic::catch_unwind(fetch).unwrap_or_else(|_| {
                tracing::warn!(%theme, "hint source panicked, using fallback");
                Hint::fallback()
            });
            // The service may be gone by now.
            let _ = tx.send((generation, hint));
        });
        self.pending = Some(generation);
    }

    /// Request the next built-in theme. Returns the theme used.
    pub fn request_next(&mut self) -> &'static str {
        let theme = THEMES[self.next_theme % THEMES.len()];
        self.next_theme += 1;
        self.request(theme);
        theme
    }

    /// Collect finished requests without blocking. Returns true if the current
    /// hint changed.
    pub fn poll(&mut self) -> bool {
        let mut updated = false;
        while let Ok((generation, hint)) = self.rx.try_recv() {
            if self.pending == Some(generation) {
                self.current = Some(hint);
                self.pending = None;
                updated = true;
            } else {
                tracing::debug!(generation, "dropping superseded hint");
                self.discarded += 1;
            }
        }
        updated
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn current(&self) -> Option<&Hint> {
        self.current.as_ref()
    }

    /// Responses dropped because a newer request had been made.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}
