use std::time::{Duration, Instant};

/// Single-slot transient notice with auto-expiry.
///
/// Posting replaces both the message and its deadline, so a pending expiry
/// of an older message can never hide a newer one. At most one message is
/// ever visible.
#[derive(Debug)]
pub struct NoticeBoard {
    ttl: Duration,
    slot: Option<(String, Instant)>,
    seq: u64,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: None,
            seq: 0,
        }
    }

    pub fn post(&mut self, message: impl Into<String>) {
        self.post_at(message, Instant::now());
    }

    pub fn current(&self) -> Option<&str> {
        self.current_at(Instant::now())
    }

    /// Increments on every post; lets a client tell a re-posted identical
    /// message apart from one it has already displayed.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    fn post_at(&mut self, message: impl Into<String>, now: Instant) {
        self.slot = Some((message.into(), now + self.ttl));
        self.seq += 1;
    }

    fn current_at(&self, now: Instant) -> Option<&str> {
        match &self.slot {
            Some((message, deadline)) if now < *deadline => Some(message.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NoticeBoard;
    use std::time::{Duration, Instant};

    #[test]
    fn message_is_visible_until_deadline() {
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        let start = Instant::now();
        board.post_at("saved", start);

        assert_eq!(board.current_at(start + Duration::from_secs(2)), Some("saved"));
        assert_eq!(board.current_at(start + Duration::from_secs(4)), None);
    }

    #[test]
    fn new_post_preempts_pending_expiry() {
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        let start = Instant::now();
        board.post_at("first", start);
        board.post_at("second", start + Duration::from_secs(2));

        // The first message's deadline has passed, but the replacement
        // restarted the clock.
        assert_eq!(
            board.current_at(start + Duration::from_secs(4)),
            Some("second")
        );
        assert_eq!(board.current_at(start + Duration::from_secs(6)), None);
    }

    #[test]
    fn empty_board_shows_nothing() {
        let board = NoticeBoard::new(Duration::from_secs(3));
        assert_eq!(board.current(), None);
        assert_eq!(board.seq(), 0);
    }

    #[test]
    fn reposting_the_same_message_advances_the_sequence() {
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        board.post("saved");
        let first = board.seq();
        board.post("saved");

        assert_eq!(board.seq(), first + 1);
    }
}
