//! Game calendar.
//!
//! One turn is one calendar month. The fiscal year starts in April, so the
//! fiscal year of a month is its calendar year from April onwards and the
//! previous calendar year from January to March.

use chancellor_types::Metadata;

/// First month of the fiscal year.
pub const FISCAL_YEAR_START_MONTH: u8 = 4;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarMonth {
    /// Month, 1--12.
    pub month: u8,
    /// Calendar year.
    pub year: i32,
}

impl CalendarMonth {
    /// The month recorded in a game's metadata, with an out-of-range month
    /// clamped into 1--12.
    pub const fn of(metadata: &Metadata) -> Self {
        let month = if metadata.month < 1 {
            1
        } else if metadata.month > 12 {
            12
        } else {
            metadata.month
        };
        Self {
            month,
            year: metadata.year,
        }
    }

    /// The following month.
    pub const fn next(self) -> Self {
        if self.month >= 12 {
            Self {
                month: 1,
                year: self.year.saturating_add(1),
            }
        } else {
            Self {
                month: self.month.saturating_add(1),
                year: self.year,
            }
        }
    }

    /// Fiscal year this month belongs to, named by its starting year.
    pub const fn fiscal_year(self) -> i32 {
        if self.month >= FISCAL_YEAR_START_MONTH {
            self.year
        } else {
            self.year.saturating_sub(1)
        }
    }

    /// Whether this month opens a fiscal year.
    pub const fn starts_fiscal_year(self) -> bool {
        self.month == FISCAL_YEAR_START_MONTH
    }

    /// Write this month into `metadata`.
    pub const fn store(self, metadata: &mut Metadata) {
        metadata.month = self.month;
        metadata.year = self.year;
    }
}
