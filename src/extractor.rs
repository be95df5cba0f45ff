use serde::{Deserialize, Serialize};

pub const DEFAULT_DEPLETED_MARKERS: &[&str] = &["out of stock", "sold out"];

/// How a count was derived from the inventory text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "count")]
pub enum StockReading {
    /// A depleted marker matched; digits elsewhere in the text are ignored.
    Depleted,
    Counted(u64),
    /// Neither a marker nor a number was found.
    Unrecognized,
}

impl StockReading {
    pub fn count(&self) -> u64 {
        match self {
            StockReading::Counted(count) => *count,
            StockReading::Depleted | StockReading::Unrecognized => 0,
        }
    }
}

/// Turns inventory status text such as "5 in stock at Tustin Store" into a count.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    depleted_markers: Vec<String>,
}

impl TextExtractor {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let depleted_markers = markers
            .into_iter()
            .map(|marker| marker.as_ref().trim().to_lowercase())
            .filter(|marker| !marker.is_empty())
            .collect();

        Self { depleted_markers }
    }

    pub fn classify(&self, text: &str) -> StockReading {
        let text = text.trim();
        let lowered = text.to_lowercase();

        if self
            .depleted_markers
            .iter()
            .any(|marker| lowered.contains(marker.as_str()))
        {
            return StockReading::Depleted;
        }

        text.split_whitespace()
            .find_map(|word| word.strip_suffix('+').unwrap_or(word).parse::<u64>().ok())
            .map_or(StockReading::Unrecognized, StockReading::Counted)
    }

    /// Unknown text counts as zero.
    pub fn extract_count(&self, text: &str) -> u64 {
        self.classify(text).count()
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_DEPLETED_MARKERS)
    }
}
