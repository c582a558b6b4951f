//! Scripted page driver for exercising the interaction plan without a
//! browser.
//!
//! Selectors answer readiness probes from a schedule; every effect the plan
//! applies is recorded in call order. Selectors with no schedule are ready
//! immediately, so the happy path needs no setup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::page::PageDriver;
use crate::script::Readiness;

/// What a scripted selector answers over successive probes.
#[derive(Debug, Clone, Copy)]
pub enum Answer {
    /// Ready from the first probe.
    Ready,
    /// Not ready for the given number of probes, ready afterwards.
    ReadyAfter(u32),
    /// Never ready; waits on it run into the deadline.
    Never,
}

/// One recorded effect, in the order the plan applied it. Probes are not
/// recorded; their counts are queryable per selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Navigate(String),
    Upload { selector: String, file: PathBuf },
    Click(String),
}

#[derive(Default)]
struct State {
    answers: HashMap<String, Answer>,
    probes: HashMap<String, u32>,
    ops: Vec<Op>,
}

#[derive(Default)]
pub struct ScriptedPage {
    state: Mutex<State>,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the answer for one selector.
    pub fn answer(mut self, selector: impl Into<String>, answer: Answer) -> Self {
        self.state.get_mut().answers.insert(selector.into(), answer);
        self
    }

    /// Takes all recorded effects, clearing the log.
    pub async fn take_ops(&self) -> Vec<Op> {
        std::mem::take(&mut self.state.lock().await.ops)
    }

    /// How many times the given selector was probed.
    pub async fn probes(&self, selector: &str) -> u32 {
        self.state
            .lock()
            .await
            .probes
            .get(selector)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl PageDriver for ScriptedPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.state
            .lock()
            .await
            .ops
            .push(Op::Navigate(url.to_string()));
        Ok(())
    }

    async fn probe(&self, selector: &str, _readiness: Readiness) -> Result<bool> {
        let mut state = self.state.lock().await;
        let seen = state.probes.entry(selector.to_string()).or_insert(0);
        *seen += 1;
        let seen = *seen;
        Ok(match state.answers.get(selector) {
            None | Some(Answer::Ready) => true,
            Some(Answer::ReadyAfter(n)) => seen > *n,
            Some(Answer::Never) => false,
        })
    }

    async fn upload(&self, selector: &str, file: &Path) -> Result<()> {
        self.state.lock().await.ops.push(Op::Upload {
            selector: selector.to_string(),
            file: file.to_path_buf(),
        });
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.state
            .lock()
            .await
            .ops
            .push(Op::Click(selector.to_string()));
        Ok(())
    }
}
