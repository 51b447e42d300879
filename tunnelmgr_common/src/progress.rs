//! Expiry progress of a tunnel with a start and end time
//!
//! The bar shows the fraction of the expiry window still remaining: 100%
//! before the window opens, 0% once it has closed.

/// Colour band of the progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Green,
    Amber,
    Red,
}

impl Band {
    /// Strict thresholds: exactly 50% is amber, exactly 20% is red
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage > 50.0 {
            Band::Green
        } else if percentage > 20.0 {
            Band::Amber
        } else {
            Band::Red
        }
    }
}

/// One evaluation of the expiry window against the clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpiryProgress {
    /// Remaining share of the window, 0..=100
    pub percentage: f64,
    pub band: Band,
    /// Milliseconds until expiry, negative once expired
    pub remaining_ms: f64,
}

impl ExpiryProgress {
    /// Evaluate the window `[start_ms, end_ms]` at `now_ms`
    pub fn compute(start_ms: f64, end_ms: f64, now_ms: f64) -> Self {
        let total = end_ms - start_ms;
        let remaining_ms = end_ms - now_ms;

        let percentage = if now_ms < start_ms {
            100.0
        } else if now_ms >= end_ms {
            0.0
        } else {
            (remaining_ms / total * 100.0).max(0.0)
        };

        Self {
            percentage,
            band: Band::for_percentage(percentage),
            remaining_ms,
        }
    }

    /// The indicator tears itself down once nothing remains
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn is_expired(&self) -> bool {
        !(self.remaining_ms > 0.0)
    }

    /// Percentage rounded for a gauge widget
    pub fn percent(&self) -> u16 {
        self.percentage.round().clamp(0.0, 100.0) as u16
    }
}
