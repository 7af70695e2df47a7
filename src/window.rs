use std::collections::VecDeque;

/// Number of transcript fragments kept in the sliding window
pub const WINDOW_CAPACITY: usize = 3;
/// Nominal duration of one fragment in seconds
pub const FRAGMENT_SECS: u64 = 10;

/// Approximate video timestamps covered by one window, formatted `M:SS`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowTimestamps {
    pub start: String,
    pub end: String,
}

/// Sliding text accumulator over the last K transcript fragments.
///
/// Pure buffering: knows nothing about claim content.
#[derive(Debug, Default)]
pub struct WindowBuffer {
    fragments: VecDeque<String>,
}

impl WindowBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment, evicting the oldest when over capacity, and return
    /// the full window text (oldest to newest, space-joined).
    pub fn add_chunk(&mut self, text: &str) -> String {
        self.fragments.push_back(text.to_string());
        while self.fragments.len() > WINDOW_CAPACITY {
            self.fragments.pop_front();
        }
        self.window_text()
    }

    pub fn window_text(&self) -> String {
        self.fragments
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Approximate timestamps for a window index: the window ends where its
    /// newest fragment ends and reaches back at most K fragments.
    pub fn timestamps_for(&self, window_index: u64) -> WindowTimestamps {
        let end = window_index * FRAGMENT_SECS;
        let start = end.saturating_sub(WINDOW_CAPACITY as u64 * FRAGMENT_SECS);
        WindowTimestamps {
            start: format_mss(start),
            end: format_mss(end),
        }
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
    }
}

fn format_mss(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
