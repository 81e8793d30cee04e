/// Direction of the two averages relative to their previous sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    /// Mixed directions, an unchanged average, or an undefined sample.
    Undecided,
}

/// Both averages must move strictly in the same direction; the averages are
/// never compared with each other.
pub fn classify(fast_prev: Option<f64>, fast: Option<f64>, slow_prev: Option<f64>, slow: Option<f64>) -> Trend {
    let (Some(fast_prev), Some(fast), Some(slow_prev), Some(slow)) = (fast_prev, fast, slow_prev, slow) else {
        return Trend::Undecided;
    };

    if fast > fast_prev && slow > slow_prev {
        Trend::Rising
    } else if fast < fast_prev && slow < slow_prev {
        Trend::Falling
    } else {
        Trend::Undecided
    }
}
