//! Transient player-facing messages
//!
//! A short queue of text notices ("Not enough energy!", "Dash!", ...). The
//! same text cannot be re-posted more often than the repeat interval, at most
//! `capacity` notices are shown at once, and each expires after its lifetime.

use std::collections::{HashMap, VecDeque};

use crate::tuning::NoticeTuning;

/// A notice currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    /// Simulation time (ms) the notice was posted
    pub posted_at: f64,
}

#[derive(Debug, Clone)]
pub struct Notices {
    config: NoticeTuning,
    active: VecDeque<Notice>,
    /// Last accepted post time per distinct text
    last_posted: HashMap<String, f64>,
}

impl Notices {
    pub fn new(config: NoticeTuning) -> Self {
        Self {
            active: VecDeque::with_capacity(config.capacity),
            last_posted: HashMap::new(),
            config,
        }
    }

    /// Post a notice. Returns false if the same text was posted too recently.
    pub fn push(&mut self, text: impl Into<String>, now_ms: f64) -> bool {
        let text = text.into();
        if let Some(&last) = self.last_posted.get(&text) {
            if now_ms - last < self.config.repeat_interval_ms {
                return false;
            }
        }
        self.last_posted.insert(text.clone(), now_ms);

        // Re-posting an on-screen text refreshes it instead of stacking
        self.active.retain(|n| n.text != text);
        self.active.push_back(Notice {
            text,
            posted_at: now_ms,
        });
        while self.active.len() > self.config.capacity {
            self.active.pop_front();
        }
        true
    }

    /// Drop notices older than their lifetime, and forget post times that
    /// can no longer block a repeat
    pub fn expire(&mut self, now_ms: f64) {
        let lifetime = self.config.lifetime_ms;
        self.active.retain(|n| now_ms - n.posted_at < lifetime);
        let interval = self.config.repeat_interval_ms;
        self.last_posted.retain(|_, &mut last| now_ms - last < interval);
    }

    /// Active notices, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.active.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.active.iter().any(|n| n.text == text)
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(NoticeTuning::default())
    }
}
