mod bests;
mod report;

pub use bests::BestsView;
pub use report::{FileLineView, SummaryView};

use is_terminal::IsTerminal;

/// Colour only when a human is looking at stdout.
pub fn use_color() -> bool {
    std::io::stdout().is_terminal()
}
