use terminal_size::{terminal_size, Width};
use textwrap::{wrap, Options};

const FALLBACK_WIDTH: usize = 80;

/// Word-wraps replies for the terminal, keeping paragraph breaks.
pub struct ReplyRenderer {
    width: usize,
}

impl ReplyRenderer {
    pub fn new(width: usize) -> Self {
        Self { width: width.max(1) }
    }

    pub fn for_terminal() -> Self {
        let width = match terminal_size() {
            Some((Width(w), _)) => (w as usize).saturating_sub(2),
            None => FALLBACK_WIDTH,
        };
        Self::new(width)
    }

    pub fn render(&self, text: &str) -> String {
        let options = Options::new(self.width)
            .initial_indent("  ")
            .subsequent_indent("  ");

        let mut output = String::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                output.push('\n');
                continue;
            }
            for wrapped in wrap(line, &options) {
                output.push_str(&wrapped);
                output.push('\n');
            }
        }
        output.trim_end().to_string()
    }
}
