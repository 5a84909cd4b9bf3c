/// Settings for a single game's knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub height: usize,
    pub width: usize,
    /// Upper bound on propagation passes per call. `None` derives a bound
    /// from the board size and the number of live sentences.
    pub pass_limit: Option<usize>,
}

impl Config {
    pub fn new(height: usize, width: usize) -> Self {
        Config {
            height,
            width,
            pass_limit: None,
        }
    }

    pub fn with_pass_limit(mut self, limit: usize) -> Self {
        self.pass_limit = Some(limit);
        self
    }

    pub fn area(&self) -> usize {
        self.height.saturating_mul(self.width)
    }

    /// Every productive pass resolves a cell or adds a sentence; a settled
    /// board needs far fewer than `H*W*(|sentences| + 1)` of them.
    pub(crate) fn passes_for(&self, sentences: usize) -> usize {
        self.pass_limit
            .unwrap_or_else(|| self.area().saturating_mul(sentences + 1).saturating_add(1))
    }
}

impl Default for Config {
    /// The classic 8x8 board.
    fn default() -> Self {
        Config::new(8, 8)
    }
}
