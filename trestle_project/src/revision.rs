// Copyright 2026 the Trestle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Revision ordering.
//!
//! Revisions are ranked by the calendar date in the first ten characters of
//! their date string, newest first, with the version label as a descending
//! tie-break. Dates that are empty or do not parse rank as the Unix epoch.
//!
//! Labels compare with [`compare_labels`]: case-insensitively first, so
//! `"a"` sorts before `"B"`, and lowercase before uppercase on a case-only
//! difference.

use core::cmp::Ordering;

use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::Revision;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses the significant part of a revision date into a Unix timestamp.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM`, and `YYYY`, interpreted as UTC midnight.
/// Anything else, including the empty string, yields `0`.
#[must_use]
pub fn revision_timestamp(date: &str) -> i64 {
    let trimmed = date.trim();
    let head = trimmed
        .char_indices()
        .nth(10)
        .map_or(trimmed, |(end, _)| &trimmed[..end]);
    let parsed = match head.len() {
        0 => return 0,
        4 => Date::parse(&format!("{head}-01-01"), ISO_DATE),
        7 => Date::parse(&format!("{head}-01"), ISO_DATE),
        _ => Date::parse(head, ISO_DATE),
    };
    parsed.map_or(0, |d| d.midnight().assume_utc().unix_timestamp())
}

/// Orders display labels and version strings for people rather than bytes.
#[must_use]
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();
    folded(a).cmp(&folded(b)).then_with(|| b.cmp(a))
}

/// Compares two revisions by recency. `Greater` means `a` is more recent.
#[must_use]
pub fn compare_recency(a: &Revision, b: &Revision) -> Ordering {
    revision_timestamp(&a.date)
        .cmp(&revision_timestamp(&b.date))
        .then_with(|| compare_labels(&a.version, &b.version))
}

/// Returns the latest revision, or `None` for an empty slice.
///
/// Among revisions tied on both date and version the earliest in `revisions`
/// wins.
#[must_use]
pub fn latest(revisions: &[Revision]) -> Option<&Revision> {
    let mut ranked = revisions.iter().map(|r| (revision_timestamp(&r.date), r));
    let first = ranked.next()?;
    let (_, best) = ranked.fold(first, |best, cand| {
        let better = cand
            .0
            .cmp(&best.0)
            .then_with(|| compare_labels(&cand.1.version, &best.1.version));
        if better == Ordering::Greater { cand } else { best }
    });
    Some(best)
}

/// All revisions ordered newest first, stable for ties.
#[must_use]
pub fn by_recency(revisions: &[Revision]) -> Vec<&Revision> {
    let mut sorted: Vec<&Revision> = revisions.iter().collect();
    sorted.sort_by(|a, b| compare_recency(b, a));
    sorted
}

#[cfg(test)]
mod tests {
    use core::cmp::Ordering;

    use super::{by_recency, compare_labels, latest, revision_timestamp};
    use crate::Revision;

    fn rev(version: &str, date: &str) -> Revision {
        Revision {
            version: version.into(),
            image: format!("{version}.png"),
            date: date.into(),
            ..Revision::default()
        }
    }

    #[test]
    fn empty_has_no_latest() {
        assert!(latest(&[]).is_none(), "nothing to choose from");
    }

    #[test]
    fn newer_date_wins() {
        let revs = [rev("A", "2024-01-01"), rev("B", "2024-02-01")];
        assert_eq!(latest(&revs).unwrap().version, "B", "February beats January");
    }

    #[test]
    fn empty_date_is_oldest() {
        let revs = [rev("A", ""), rev("B", "2024-01-01")];
        assert_eq!(latest(&revs).unwrap().version, "B", "empty date ranks at 0");
    }

    #[test]
    fn same_date_breaks_on_version_descending() {
        let revs = [rev("A", "2024-01-01"), rev("B", "2024-01-01")];
        assert_eq!(latest(&revs).unwrap().version, "B", "B sorts after A");
        let swapped = [rev("B", "2024-01-01"), rev("A", "2024-01-01")];
        assert_eq!(latest(&swapped).unwrap().version, "B", "input order does not matter");
    }

    #[test]
    fn version_tie_break_ignores_case() {
        let revs = [rev("B", "2024-01-01"), rev("a", "2024-01-01")];
        assert_eq!(latest(&revs).unwrap().version, "B", "B outranks a");
        let order: Vec<&str> = by_recency(&revs).iter().map(|r| r.version.as_str()).collect();
        assert_eq!(order, ["B", "a"], "descending without regard to case");

        assert_eq!(compare_labels("a", "B"), Ordering::Less, "a before B");
        assert_eq!(compare_labels("a", "A"), Ordering::Less, "lowercase first");
        assert_eq!(compare_labels("R2", "r2"), Ordering::Greater, "case-only difference");
        assert_eq!(compare_labels("x", "x"), Ordering::Equal, "equal labels");
    }

    #[test]
    fn exact_ties_keep_input_order() {
        let mut first = rev("R1", "2024-05-05");
        first.image = "first.png".into();
        let mut second = rev("R1", "2024-05-05");
        second.image = "second.png".into();
        let revs = [first, second];
        assert_eq!(latest(&revs).unwrap().image, "first.png", "stable on full ties");
        assert_eq!(by_recency(&revs)[0].image, "first.png", "sort is stable too");
    }

    #[test]
    fn only_first_ten_characters_count() {
        assert_eq!(
            revision_timestamp("2024-03-01T23:59:59Z"),
            revision_timestamp("2024-03-01"),
            "time of day is ignored"
        );
        assert_eq!(revision_timestamp("  2024-03-01  "), revision_timestamp("2024-03-01"), "trimmed");
        assert_eq!(revision_timestamp("1970-01-02"), 86_400, "UTC midnight");
    }

    #[test]
    fn partial_and_bad_dates() {
        assert_eq!(revision_timestamp("2024-03"), revision_timestamp("2024-03-01"), "month only");
        assert_eq!(revision_timestamp("2024"), revision_timestamp("2024-01-01"), "year only");
        assert_eq!(revision_timestamp("not a date"), 0, "garbage is epoch");
        assert_eq!(revision_timestamp("2024-13-01"), 0, "invalid month is epoch");
    }

    #[test]
    fn recency_listing() {
        let revs = [rev("R1", "2024-01-01"), rev("R3", ""), rev("R2", "2024-03-01")];
        let order: Vec<&str> = by_recency(&revs).iter().map(|r| r.version.as_str()).collect();
        assert_eq!(order, ["R2", "R1", "R3"], "newest first, undated last");
    }
}
