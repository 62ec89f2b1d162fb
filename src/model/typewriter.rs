use std::time::Duration;

/// Reveals a line of text one character at a time, like it's being typed.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    revealed: usize, // in bytes, always on a char boundary
    delay: Duration,
    pending: Duration,
    running: bool,
}

impl Typewriter {
    pub fn new(text: impl Into<String>, delay: Duration) -> Self {
        Typewriter {
            text: text.into(),
            revealed: 0,
            delay,
            pending: Duration::ZERO,
            running: false,
        }
    }

    /// Clears the revealed text and starts typing again. The first character
    /// appears on the next `advance`, however small the step.
    pub fn restart(&mut self) {
        self.revealed = 0;
        self.pending = self.delay;
        self.running = true;
    }

    pub fn advance(&mut self, dt: Duration) {
        if !self.running {
            return;
        }

        self.pending += dt;
        while self.pending >= self.delay {
            match self.text[self.revealed..].chars().next() {
                Some(c) => {
                    self.revealed += c.len_utf8();
                    self.pending -= self.delay;
                }
                None => break,
            }
        }

        if self.is_finished() {
            self.running = false;
            self.pending = Duration::ZERO;
        }
    }

    pub fn shown(&self) -> &str {
        &self.text[..self.revealed]
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.revealed == self.text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(40);

    #[test]
    fn test_idle_until_started() {
        let mut tw = Typewriter::new("hello", DELAY);
        tw.advance(Duration::from_secs(10));
        assert_eq!(tw.shown(), "");
        assert!(!tw.is_running());
    }

    #[test]
    fn test_one_char_per_delay() {
        let mut tw = Typewriter::new("hello", DELAY);
        tw.restart();

        tw.advance(Duration::ZERO);
        assert_eq!(tw.shown(), "h");

        tw.advance(Duration::from_millis(39));
        assert_eq!(tw.shown(), "h");
        tw.advance(Duration::from_millis(1));
        assert_eq!(tw.shown(), "he");

        // A long frame catches up by several characters
        tw.advance(Duration::from_millis(80));
        assert_eq!(tw.shown(), "hell");
        assert!(tw.is_running());

        tw.advance(Duration::from_millis(40));
        assert_eq!(tw.shown(), "hello");
        assert!(tw.is_finished());
        assert!(!tw.is_running());

        tw.advance(Duration::from_secs(1));
        assert_eq!(tw.shown(), "hello");
    }

    #[test]
    fn test_every_prefix_is_shown() {
        let text = "Hi, wörld ☀";
        let mut tw = Typewriter::new(text, DELAY);
        tw.restart();

        let mut seen = vec![];
        while !tw.is_finished() {
            tw.advance(DELAY);
            seen.push(tw.shown().to_owned());
        }

        let expected: Vec<String> = text
            .char_indices()
            .map(|(i, c)| text[..i + c.len_utf8()].to_owned())
            .collect();
        // The first advance of a full delay reveals two: the one due
        // immediately and the one due after the delay.
        assert_eq!(seen[0], expected[1]);
        assert_eq!(&seen[1..], &expected[2..]);
    }

    #[test]
    fn test_restart_starts_over() {
        let mut tw = Typewriter::new("abc", DELAY);
        tw.restart();
        tw.advance(Duration::from_secs(1));
        assert_eq!(tw.shown(), "abc");

        tw.restart();
        assert_eq!(tw.shown(), "");
        assert!(tw.is_running());
        tw.advance(Duration::ZERO);
        assert_eq!(tw.shown(), "a");
    }
}
