use owo_colors::OwoColorize;
use std::fmt;
use viscose_types::{PersonalBestEntry, format_score};

pub struct BestsView<'a> {
    entries: &'a [PersonalBestEntry],
    color: bool,
}

impl<'a> BestsView<'a> {
    pub fn new(entries: &'a [PersonalBestEntry], color: bool) -> Self {
        Self { entries, color }
    }
}

impl fmt::Display for BestsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "No personal bests recorded yet.");
        }

        let width = self
            .entries
            .iter()
            .map(|e| e.scenario.chars().count())
            .max()
            .unwrap_or(0)
            .max("SCENARIO".len());

        let header = format!("{:<width$}  {:>10}  UPDATED", "SCENARIO", "BEST");
        if self.color {
            writeln!(f, "{}", header.bold())?;
        } else {
            writeln!(f, "{}", header)?;
        }

        for entry in self.entries {
            let updated = entry.last_updated_at.format("%Y-%m-%d %H:%M");
            writeln!(
                f,
                "{:<width$}  {:>10}  {}",
                entry.scenario,
                format_score(entry.best_value),
                updated
            )?;
        }
        Ok(())
    }
}
