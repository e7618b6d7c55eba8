use chrono::{DateTime, Duration, Utc};

/// Which rolling window a summary request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Weekly,
    Monthly,
}

impl Period {
    pub fn days(self) -> i64 {
        match self {
            Period::Weekly => 7,
            Period::Monthly => 30,
        }
    }

    /// Human label used in the summary prompt. Kept in English since this
    /// value is interpolated into a template rather than shown directly.
    pub fn label(self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "weekly" => Some(Period::Weekly),
            "monthly" => Some(Period::Monthly),
            _ => None,
        }
    }
}

/// `{family_id, start, end}`, closed-closed.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodWindow {
    pub family_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PeriodWindow {
    pub fn new(family_id: impl Into<String>, period: Period, now: DateTime<Utc>) -> Self {
        Self {
            family_id: family_id.into(),
            start: now - Duration::days(period.days()),
            end: now,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_window_spans_seven_days() {
        let now = Utc::now();
        let window = PeriodWindow::new("F1", Period::Weekly, now);
        assert_eq!((now - window.start).num_days(), 7);
        assert_eq!(window.end, now);
    }

    #[test]
    fn window_is_closed_closed() {
        let now = Utc::now();
        let window = PeriodWindow::new("F1", Period::Weekly, now);
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
    }

    #[test]
    fn parses_known_labels_only() {
        assert_eq!(Period::parse("weekly"), Some(Period::Weekly));
        assert_eq!(Period::parse("MONTHLY"), Some(Period::Monthly));
        assert_eq!(Period::parse("yearly"), None);
    }
}
