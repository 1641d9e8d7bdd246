//! Observer that records run events for assertions.
#![allow(dead_code)]

use mannequin::{CancelToken, RenderObserver, RenderOutput};

/// One observed event.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
    Progress(u8),
    Log(String),
    Error(String),
    Completed { frames: usize, fps: f64 },
    Finished,
}

#[derive(Debug)]
enum CancelTrigger {
    AfterProgress(usize),
    OnLog(&'static str),
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    /// Events in arrival order.
    pub events: Vec<RenderEvent>,
    trigger: Option<(CancelTrigger, CancelToken)>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger `token` once `n` progress events have been seen.
    pub fn cancel_after(n: usize, token: CancelToken) -> Self {
        Self {
            events: Vec::new(),
            trigger: Some((CancelTrigger::AfterProgress(n), token)),
        }
    }

    /// Trigger `token` on the first log line starting with `prefix`.
    pub fn cancel_on_log(prefix: &'static str, token: CancelToken) -> Self {
        Self {
            events: Vec::new(),
            trigger: Some((CancelTrigger::OnLog(prefix), token)),
        }
    }

    pub fn count(&self, pred: impl Fn(&RenderEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn progress_values(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl RenderObserver for RecordingObserver {
    fn progress(&mut self, percent: u8) {
        self.events.push(RenderEvent::Progress(percent));
        if let Some((CancelTrigger::AfterProgress(n), token)) = &self.trigger
            && self.count(|e| matches!(e, RenderEvent::Progress(_))) >= *n
        {
            token.cancel();
        }
    }

    fn log(&mut self, message: &str) {
        self.events.push(RenderEvent::Log(message.to_owned()));
        if let Some((CancelTrigger::OnLog(prefix), token)) = &self.trigger
            && message.starts_with(prefix)
        {
            token.cancel();
        }
    }

    fn error(&mut self, message: &str) {
        self.events.push(RenderEvent::Error(message.to_owned()));
    }

    fn completed(&mut self, output: &RenderOutput) {
        self.events.push(RenderEvent::Completed {
            frames: output.frames.len(),
            fps: output.fps,
        });
    }

    fn finished(&mut self) {
        self.events.push(RenderEvent::Finished);
    }
}
