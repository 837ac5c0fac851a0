//! Reassembles NDJSON lines from decoded text fragments.

/// Holds the unterminated suffix of everything decoded so far.
///
/// After every [`push`](LineBuffer::push) the buffer never contains a `\n`:
/// complete lines are handed out immediately and only the trailing partial
/// line is kept until a newline or the end of the stream arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    partial: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `fragment` and calls `on_line` for each line it completes.
    /// Whitespace-only lines are not handed out.
    pub fn push<F>(&mut self, fragment: &str, mut on_line: F)
    where
        F: FnMut(&str),
    {
        let last_newline = match fragment.rfind('\n') {
            Some(index) => index,
            None => {
                self.partial.push_str(fragment);
                return;
            }
        };

        self.partial.push_str(&fragment[..last_newline]);
        for line in self.partial.split('\n') {
            if !line.trim().is_empty() {
                on_line(line);
            }
        }
        self.partial.clear();
        self.partial.push_str(&fragment[last_newline + 1..]);
    }

    /// Ends the stream, returning the leftover text as a final line unless
    /// it is blank.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.partial);
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    pub fn pending_len(&self) -> usize {
        self.partial.len()
    }
}
