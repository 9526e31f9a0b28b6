//! Bounded ring of recent chat lines.
//!
//! The log lives for the whole publisher lifetime. Each new line is
//! appended at the back; once the ring holds [`CHAT_CAPACITY`] lines the
//! oldest is evicted.

use std::collections::VecDeque;

use scenecast_types::ChatLogEntry;

/// Number of chat lines kept.
pub const CHAT_CAPACITY: usize = 10;

/// Sender label used for lines without a sender name.
const SYSTEM_SENDER: &str = "System";

/// Format a chat line as `[Sender] message`, or `[System] message` when
/// the sender is absent or empty.
pub fn format_chat_line(sender: Option<&str>, message: &str) -> ChatLogEntry {
    let sender = sender.filter(|s| !s.is_empty()).unwrap_or(SYSTEM_SENDER);
    ChatLogEntry(format!("[{sender}] {message}"))
}

/// Append-only ring of the most recent chat lines, oldest first.
#[derive(Debug, Clone)]
pub struct ChatLog {
    entries: VecDeque<ChatLogEntry>,
    capacity: usize,
}

impl ChatLog {
    /// A ring holding [`CHAT_CAPACITY`] lines.
    pub fn new() -> Self {
        Self::with_capacity(CHAT_CAPACITY)
    }

    /// A ring holding `capacity` lines. A zero capacity keeps nothing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a formatted line, evicting the oldest on overflow.
    pub fn push(&mut self, entry: ChatLogEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Format and append a raw chat message.
    pub fn record(&mut self, sender: Option<&str>, message: &str) {
        self.push(format_chat_line(sender, message));
    }

    /// Lines oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ChatLogEntry> {
        self.entries.iter()
    }

    /// Copy of the lines, oldest first.
    pub fn to_vec(&self) -> Vec<ChatLogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Number of lines held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no line is held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sender_and_system_lines() {
        assert_eq!(format_chat_line(Some("Zezima"), "hi").text(), "[Zezima] hi");
        assert_eq!(format_chat_line(None, "You get some logs.").text(), "[System] You get some logs.");
        assert_eq!(format_chat_line(Some(""), "Welcome.").text(), "[System] Welcome.");
    }

    #[test]
    fn eleventh_line_evicts_the_oldest() {
        let mut log = ChatLog::new();
        for i in 0..10 {
            log.record(None, &format!("line {i}"));
        }
        assert_eq!(log.len(), 10);
        log.record(None, "line 10");
        assert_eq!(log.len(), 10);
        let texts: Vec<_> = log.iter().map(ChatLogEntry::text).collect();
        assert_eq!(texts.first().copied(), Some("[System] line 1"));
        assert_eq!(texts.last().copied(), Some("[System] line 10"));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut log = ChatLog::with_capacity(3);
        for i in 0..50 {
            log.record(Some("bot"), &i.to_string());
            assert!(log.len() <= 3);
        }
        let texts: Vec<_> = log.to_vec().into_iter().map(|e| e.0).collect();
        assert_eq!(texts, vec!["[bot] 47", "[bot] 48", "[bot] 49"]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut log = ChatLog::with_capacity(0);
        log.record(None, "dropped");
        assert!(log.is_empty());
    }

    #[test]
    fn clear_empties_the_ring() {
        let mut log = ChatLog::new();
        log.record(None, "x");
        log.clear();
        assert!(log.is_empty());
    }
}
