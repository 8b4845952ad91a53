use std::cmp::Ordering;

use arama_core::Season;
use chrono::NaiveDate;

/// Resolves the season that prices a given night.
///
/// Holds a snapshot of the season table so a whole stay is priced against
/// one consistent view.
#[derive(Debug, Clone)]
pub struct SeasonResolver {
    seasons: Vec<Season>,
}

impl SeasonResolver {
    pub fn new(seasons: Vec<Season>) -> Self {
        let defaults = seasons.iter().filter(|s| s.is_default).count();
        if defaults > 1 {
            tracing::warn!(
                "{} seasons are flagged default; using the highest-rated one",
                defaults
            );
        }
        Self { seasons }
    }

    /// The matching non-default season with the highest nightly rate, else
    /// the default season, else nothing.
    pub fn resolve(&self, date: NaiveDate) -> Option<&Season> {
        self.seasons
            .iter()
            .filter(|s| !s.is_default && s.covers(date))
            .max_by(|a, b| precedence(a, b))
            .or_else(|| self.default_season())
    }

    pub fn default_season(&self) -> Option<&Season> {
        self.seasons
            .iter()
            .filter(|s| s.is_default)
            .max_by(|a, b| precedence(a, b))
    }

    pub fn len(&self) -> usize {
        self.seasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }
}

// Higher rate wins; equal rates fall back to name, then id, so the
// outcome never depends on storage order.
fn precedence(a: &Season, b: &Season) -> Ordering {
    a.nightly_rate
        .cmp(&b.nightly_rate)
        .then_with(|| b.name.cmp(&a.name))
        .then_with(|| b.id.cmp(&a.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn season(name: &str, start: &str, end: &str, rate: Decimal, is_default: bool) -> Season {
        Season {
            id: Uuid::new_v4(),
            name: name.to_string(),
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            nightly_rate: rate,
            is_default,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn villa_seasons() -> SeasonResolver {
        SeasonResolver::new(vec![
            season("Regular Season", "01-01", "12-31", dec!(200), true),
            season("Peak Season", "12-15", "01-10", dec!(350), false),
            season("High Season", "07-01", "08-31", dec!(280), false),
        ])
    }

    #[test]
    fn test_wraparound_season_matches_both_sides_of_new_year() {
        let resolver = villa_seasons();
        assert_eq!(resolver.resolve(date("2024-12-20")).unwrap().name, "Peak Season");
        assert_eq!(resolver.resolve(date("2025-01-05")).unwrap().name, "Peak Season");
        assert_eq!(resolver.resolve(date("2025-06-01")).unwrap().name, "Regular Season");
    }

    #[test]
    fn test_falls_back_to_default() {
        let resolver = villa_seasons();
        let season = resolver.resolve(date("2024-03-10")).unwrap();
        assert!(season.is_default);
        assert_eq!(season.nightly_rate, dec!(200));
    }

    #[test]
    fn test_highest_rate_wins_on_overlap() {
        let resolver = SeasonResolver::new(vec![
            season("Summer", "06-01", "09-30", dec!(250), false),
            season("Festival", "08-10", "08-20", dec!(400), false),
            season("Shoulder", "08-01", "08-31", dec!(220), false),
        ]);
        assert_eq!(resolver.resolve(date("2024-08-15")).unwrap().name, "Festival");
        assert_eq!(resolver.resolve(date("2024-08-25")).unwrap().name, "Summer");
        assert_eq!(resolver.resolve(date("2024-06-15")).unwrap().name, "Summer");
    }

    #[test]
    fn test_equal_rates_resolve_deterministically() {
        let a = season("Alpha", "05-01", "05-31", dec!(300), false);
        let b = season("Beta", "05-10", "05-20", dec!(300), false);
        let forward = SeasonResolver::new(vec![a.clone(), b.clone()]);
        let backward = SeasonResolver::new(vec![b, a]);
        let day = date("2024-05-15");
        assert_eq!(forward.resolve(day).unwrap().name, "Alpha");
        assert_eq!(backward.resolve(day).unwrap().name, "Alpha");
    }

    #[test]
    fn test_default_is_never_matched_by_range() {
        // A default season only applies as a fallback, even if its range
        // would beat a cheaper matching season.
        let resolver = SeasonResolver::new(vec![
            season("Default", "01-01", "12-31", dec!(500), true),
            season("Low", "02-01", "02-28", dec!(120), false),
        ]);
        assert_eq!(resolver.resolve(date("2024-02-10")).unwrap().name, "Low");
        assert_eq!(resolver.resolve(date("2024-03-10")).unwrap().name, "Default");
    }

    #[test]
    fn test_no_seasons_resolves_nothing() {
        let resolver = SeasonResolver::new(vec![
            season("High Season", "07-01", "08-31", dec!(280), false),
        ]);
        assert!(resolver.resolve(date("2024-03-10")).is_none());
        assert!(SeasonResolver::new(Vec::new()).resolve(date("2024-03-10")).is_none());
    }

    #[test]
    fn test_leap_day_resolution() {
        let resolver = SeasonResolver::new(vec![
            season("Late Winter", "02-20", "03-05", dec!(260), false),
            season("Regular", "01-01", "12-31", dec!(200), true),
        ]);
        assert_eq!(resolver.resolve(date("2024-02-29")).unwrap().name, "Late Winter");
    }

    #[test]
    fn test_multiple_defaults_pick_highest_rate() {
        let resolver = SeasonResolver::new(vec![
            season("Base", "01-01", "12-31", dec!(180), true),
            season("Regular", "01-01", "12-31", dec!(200), true),
        ]);
        assert_eq!(resolver.resolve(date("2024-04-01")).unwrap().name, "Regular");
    }
}
