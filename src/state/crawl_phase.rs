/// Crawl phase definitions for the coordinator
///
/// A crawl moves strictly forward through these phases.
use std::fmt;

/// Represents the phase a crawl run is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Fetching and extracting the first page to learn the page count
    Bootstrapping,

    /// Launching one worker per remaining page
    FanningOut,

    /// Waiting for worker results under the per-await timeout
    Collecting,

    /// Merging batches and ordering them by id
    Sorting,

    /// Result is ready
    Done,
}

impl CrawlPhase {
    /// Returns the phase following this one, or None for `Done`
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Bootstrapping => Some(Self::FanningOut),
            Self::FanningOut => Some(Self::Collecting),
            Self::Collecting => Some(Self::Sorting),
            Self::Sorting => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Returns true if moving from this phase to `to` is allowed
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    /// Returns true once the crawl result is available
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bootstrapping => "bootstrapping",
            Self::FanningOut => "fanning_out",
            Self::Collecting => "collecting",
            Self::Sorting => "sorting",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
