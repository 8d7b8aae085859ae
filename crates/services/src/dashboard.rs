use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike};

use lamed_core::model::{Category, ProgressEntry};
use storage::repository::ProgressRepository;

use crate::Clock;
use crate::error::DashboardError;

/// Trailing window the parent dashboard loads by default.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Days in the activity/consistency window.
const ACTIVITY_DAYS: u32 = 7;

/// How many groups the strengths and weaknesses lists keep.
const TOP_GROUPS: usize = 3;

//
// ─── REPORT TYPES ──────────────────────────────────────────────────────────────
//

/// Aggregate score for one (category, item range) group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupScore {
    pub category: Category,
    pub item_range: u32,
    pub correct: u32,
    pub total: u32,
    pub score: u32,
}

/// Aggregate score for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryScore {
    pub category: Category,
    pub total: u32,
    pub score: u32,
}

/// Entry count for one day of the trailing week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub entries: u32,
}

/// Daily period buckets: morning [6,12), afternoon [12,18), evening otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 3] = [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening];

    #[must_use]
    pub fn of_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }
}

/// Aggregate score for one time-of-day bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOfDayScore {
    pub period: TimeOfDay,
    pub activities: u32,
    pub score: u32,
}

/// Everything the parent dashboard renders, derived on demand and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateReport {
    pub average_score: u32,
    pub total_questions: u32,
    pub total_time_secs: u32,
    pub strengths: Vec<GroupScore>,
    pub weaknesses: Vec<GroupScore>,
    pub category_progress: Vec<CategoryScore>,
    /// Seven days ending today, oldest first.
    pub daily_activity: Vec<DayActivity>,
    pub consistency_score: u32,
    pub performance_by_time_of_day: Vec<TimeOfDayScore>,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(correct) / f64::from(total) * 100.0).round() as u32
}

//
// ─── AGGREGATIONS ──────────────────────────────────────────────────────────────
//

/// Mean of the per-entry percentage scores, rounded; 0 on empty input.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn average_score(entries: &[ProgressEntry]) -> u32 {
    if entries.is_empty() {
        return 0;
    }
    let sum: f64 = entries
        .iter()
        .map(|entry| {
            f64::from(entry.correct_answers()) / f64::from(entry.total_questions()) * 100.0
        })
        .sum();
    (sum / entries.len() as f64).round() as u32
}

/// Group entries by (category, item range) and rank the groups by score.
///
/// Groups keep first-seen order, so ties resolve by input iteration order
/// through the stable sorts. Returns (strengths, weaknesses): the top and
/// bottom three groups.
#[must_use]
pub fn strengths_and_weaknesses(
    entries: &[ProgressEntry],
) -> (Vec<GroupScore>, Vec<GroupScore>) {
    let mut groups: Vec<GroupScore> = Vec::new();
    for entry in entries {
        let key = (entry.category(), entry.item_range());
        match groups
            .iter()
            .position(|group| (group.category, group.item_range) == key)
        {
            Some(index) => {
                groups[index].correct += entry.correct_answers();
                groups[index].total += entry.total_questions();
            }
            None => groups.push(GroupScore {
                category: entry.category(),
                item_range: entry.item_range(),
                correct: entry.correct_answers(),
                total: entry.total_questions(),
                score: 0,
            }),
        }
    }
    for group in &mut groups {
        group.score = round_percent(group.correct, group.total);
    }

    let mut strengths = groups.clone();
    strengths.sort_by(|a, b| b.score.cmp(&a.score));
    strengths.truncate(TOP_GROUPS);

    let mut weaknesses = groups;
    weaknesses.sort_by_key(|group| group.score);
    weaknesses.truncate(TOP_GROUPS);

    (strengths, weaknesses)
}

/// Aggregate score per category across the four fixed categories; categories
/// with no questions are omitted.
#[must_use]
pub fn category_progress(entries: &[ProgressEntry]) -> Vec<CategoryScore> {
    Category::ALL
        .iter()
        .filter_map(|&category| {
            let (correct, total) = entries
                .iter()
                .filter(|entry| entry.category() == category)
                .fold((0_u32, 0_u32), |(correct, total), entry| {
                    (
                        correct + entry.correct_answers(),
                        total + entry.total_questions(),
                    )
                });
            (total > 0).then(|| CategoryScore {
                category,
                total,
                score: round_percent(correct, total),
            })
        })
        .collect()
}

/// Per-day entry counts for the seven calendar days ending today
/// (inclusive), plus the consistency score: the percentage of those days
/// with at least one entry.
///
/// "Today" and each entry's day are taken in the timezone of `now`.
#[must_use]
pub fn daily_activity<Tz: TimeZone>(
    entries: &[ProgressEntry],
    now: &DateTime<Tz>,
) -> (Vec<DayActivity>, u32) {
    let today = now.date_naive();
    let mut activity: Vec<DayActivity> = (0..ACTIVITY_DAYS)
        .rev()
        .map(|back| DayActivity {
            date: today - Duration::days(i64::from(back)),
            entries: 0,
        })
        .collect();

    let zone = now.timezone();
    for entry in entries {
        let date = entry.recorded_at().with_timezone(&zone).date_naive();
        if let Some(day) = activity.iter_mut().find(|day| day.date == date) {
            day.entries += 1;
        }
    }

    let active_days = activity.iter().filter(|day| day.entries > 0).count();
    let consistency = round_percent(u32::try_from(active_days).unwrap_or(0), ACTIVITY_DAYS);
    (activity, consistency)
}

/// Aggregate score per time-of-day bucket; buckets with no entries are
/// omitted. Hours are taken in the timezone of `now`.
#[must_use]
pub fn performance_by_time_of_day<Tz: TimeZone>(
    entries: &[ProgressEntry],
    now: &DateTime<Tz>,
) -> Vec<TimeOfDayScore> {
    let zone = now.timezone();
    let mut buckets = TimeOfDay::ALL.map(|period| (period, 0_u32, 0_u32));

    for entry in entries {
        let hour = entry.recorded_at().with_timezone(&zone).hour();
        let period = TimeOfDay::of_hour(hour);
        if let Some((_, correct, total)) = buckets.iter_mut().find(|(p, _, _)| *p == period) {
            *correct += entry.correct_answers();
            *total += entry.total_questions();
        }
    }

    buckets
        .into_iter()
        .filter(|(_, _, total)| *total > 0)
        .map(|(period, correct, total)| TimeOfDayScore {
            period,
            activities: total,
            score: round_percent(correct, total),
        })
        .collect()
}

/// Compute the full dashboard report over a history snapshot.
///
/// The five aggregations are independent; all of them tolerate empty and
/// single-entry input.
#[must_use]
pub fn report<Tz: TimeZone>(entries: &[ProgressEntry], now: &DateTime<Tz>) -> AggregateReport {
    let (strengths, weaknesses) = strengths_and_weaknesses(entries);
    let (daily, consistency_score) = daily_activity(entries, now);

    AggregateReport {
        average_score: average_score(entries),
        total_questions: entries.iter().map(ProgressEntry::total_questions).sum(),
        total_time_secs: entries.iter().map(ProgressEntry::time_taken_secs).sum(),
        strengths,
        weaknesses,
        category_progress: category_progress(entries),
        daily_activity: daily,
        consistency_score,
        performance_by_time_of_day: performance_by_time_of_day(entries, now),
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Parent-dashboard facade that hides repositories and time from the UI.
#[derive(Clone)]
pub struct DashboardService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, progress }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Load a trailing window of history and compute the report in the
    /// given timezone.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Storage` on repository failures.
    pub async fn load_report<Tz: TimeZone>(
        &self,
        window_days: i64,
        zone: &Tz,
    ) -> Result<AggregateReport, DashboardError> {
        let now = self.clock.now();
        let entries = self.progress.list_since(now - Duration::days(window_days)).await?;
        Ok(report(&entries, &now.with_timezone(zone)))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use lamed_core::time::fixed_now;

    fn entry(
        id: i64,
        recorded_at: DateTime<Utc>,
        category: Category,
        correct: u32,
        total: u32,
        range: u32,
    ) -> ProgressEntry {
        ProgressEntry::from_persisted(id, recorded_at, category, correct, total, 30, range)
            .unwrap()
    }

    #[test]
    fn average_score_handles_empty_and_mixed_input() {
        assert_eq!(average_score(&[]), 0);

        let now = fixed_now();
        let entries = vec![
            entry(1, now, Category::Numbers, 8, 10, 20),
            entry(2, now, Category::Numbers, 6, 10, 20),
        ];
        assert_eq!(average_score(&entries), 70);
    }

    #[test]
    fn single_entry_average_is_its_own_score() {
        let entries = vec![entry(1, fixed_now(), Category::QuickMath, 2, 3, 10)];
        assert_eq!(average_score(&entries), 67);
    }

    #[test]
    fn single_group_lands_in_both_lists() {
        let now = fixed_now();
        let entries = vec![
            entry(1, now, Category::Numbers, 3, 5, 20),
            entry(2, now, Category::Numbers, 4, 5, 20),
        ];

        let (strengths, weaknesses) = strengths_and_weaknesses(&entries);
        assert_eq!(strengths.len(), 1);
        assert_eq!(weaknesses.len(), 1);
        assert_eq!(strengths[0], weaknesses[0]);
        assert_eq!(strengths[0].correct, 7);
        assert_eq!(strengths[0].total, 10);
        assert_eq!(strengths[0].score, 70);
    }

    #[test]
    fn groups_rank_by_score_with_stable_ties() {
        let now = fixed_now();
        let entries = vec![
            entry(1, now, Category::Numbers, 9, 10, 10),
            entry(2, now, Category::Numbers, 5, 10, 20),
            entry(3, now, Category::HebrewLetters, 5, 10, 22),
            entry(4, now, Category::EnglishLetters, 2, 10, 26),
            entry(5, now, Category::QuickMath, 7, 10, 10),
        ];

        let (strengths, weaknesses) = strengths_and_weaknesses(&entries);
        assert_eq!(strengths.len(), 3);
        assert_eq!(strengths[0].category, Category::Numbers);
        assert_eq!(strengths[0].item_range, 10);
        assert_eq!(strengths[1].category, Category::QuickMath);
        // The two 50% groups tie; first-seen order breaks the tie.
        assert_eq!(strengths[2].category, Category::Numbers);
        assert_eq!(strengths[2].item_range, 20);

        assert_eq!(weaknesses[0].category, Category::EnglishLetters);
        assert_eq!(weaknesses[1].category, Category::Numbers);
        assert_eq!(weaknesses[1].item_range, 20);
        assert_eq!(weaknesses[2].category, Category::HebrewLetters);
    }

    #[test]
    fn empty_history_yields_empty_lists() {
        let (strengths, weaknesses) = strengths_and_weaknesses(&[]);
        assert!(strengths.is_empty());
        assert!(weaknesses.is_empty());
        assert!(category_progress(&[]).is_empty());
        assert!(performance_by_time_of_day(&[], &fixed_now()).is_empty());
    }

    #[test]
    fn categories_without_questions_are_omitted() {
        let now = fixed_now();
        let entries = vec![
            entry(1, now, Category::Numbers, 3, 5, 20),
            entry(2, now, Category::QuickMath, 9, 10, 10),
        ];

        let progress = category_progress(&entries);
        assert_eq!(progress.len(), 2);
        assert_eq!(progress[0].category, Category::Numbers);
        assert_eq!(progress[0].score, 60);
        assert_eq!(progress[1].category, Category::QuickMath);
        assert_eq!(progress[1].score, 90);
    }

    #[test]
    fn consistency_counts_active_days_in_the_window() {
        let now = fixed_now();
        let mut entries = Vec::new();
        // Ten entries over four distinct days inside the window.
        for (id, back) in [(1, 0), (2, 0), (3, 1), (4, 1), (5, 2), (6, 2), (7, 3)] {
            entries.push(entry(
                id,
                now - Duration::days(back),
                Category::Numbers,
                3,
                5,
                20,
            ));
        }
        entries.push(entry(8, now - Duration::days(3), Category::Numbers, 3, 5, 20));
        entries.push(entry(9, now - Duration::days(2), Category::Numbers, 3, 5, 20));
        // Outside the window entirely.
        entries.push(entry(10, now - Duration::days(10), Category::Numbers, 3, 5, 20));

        let (activity, consistency) = daily_activity(&entries, &now);
        assert_eq!(activity.len(), 7);
        assert_eq!(activity[6].date, now.date_naive());
        assert_eq!(activity[6].entries, 2);
        assert_eq!(consistency, 57);
    }

    #[test]
    fn full_week_scores_a_hundred() {
        let now = fixed_now();
        let entries: Vec<_> = (0..7)
            .map(|back| {
                entry(
                    back + 1,
                    now - Duration::days(back),
                    Category::Numbers,
                    3,
                    5,
                    20,
                )
            })
            .collect();

        let (_, consistency) = daily_activity(&entries, &now);
        assert_eq!(consistency, 100);
    }

    #[test]
    fn time_of_day_buckets_follow_the_local_hour() {
        // 2023-11-14T22:13:20Z; in UTC+2 that is 00:13 on the 15th.
        let now = fixed_now();
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_now = now.with_timezone(&zone);

        let morning = Utc.with_ymd_and_hms(2023, 11, 14, 7, 0, 0).unwrap(); // 09:00 local
        let afternoon = Utc.with_ymd_and_hms(2023, 11, 14, 11, 0, 0).unwrap(); // 13:00 local
        let late = Utc.with_ymd_and_hms(2023, 11, 14, 22, 0, 0).unwrap(); // 00:00 local

        let entries = vec![
            entry(1, morning, Category::Numbers, 5, 5, 20),
            entry(2, afternoon, Category::Numbers, 3, 5, 20),
            entry(3, late, Category::Numbers, 1, 5, 20),
        ];

        let buckets = performance_by_time_of_day(&entries, &local_now);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].period, TimeOfDay::Morning);
        assert_eq!(buckets[0].score, 100);
        assert_eq!(buckets[1].period, TimeOfDay::Afternoon);
        assert_eq!(buckets[1].score, 60);
        assert_eq!(buckets[2].period, TimeOfDay::Evening);
        assert_eq!(buckets[2].score, 20);

        // The same entries bucket differently in UTC.
        let utc_buckets = performance_by_time_of_day(&entries, &now);
        assert_eq!(utc_buckets.len(), 2);
        assert_eq!(utc_buckets[0].period, TimeOfDay::Morning);
        assert_eq!(utc_buckets[0].activities, 10);
    }

    #[test]
    fn hour_boundaries_split_cleanly() {
        assert_eq!(TimeOfDay::of_hour(5), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::of_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::of_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::of_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::of_hour(17), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::of_hour(18), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::of_hour(23), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::of_hour(0), TimeOfDay::Evening);
    }

    #[test]
    fn report_bundles_the_totals() {
        let now = fixed_now();
        let entries = vec![
            entry(1, now, Category::Numbers, 8, 10, 20),
            entry(2, now - Duration::days(1), Category::QuickMath, 6, 10, 10),
        ];

        let report = report(&entries, &now);
        assert_eq!(report.average_score, 70);
        assert_eq!(report.total_questions, 20);
        assert_eq!(report.total_time_secs, 60);
        assert_eq!(report.strengths.len(), 2);
        assert_eq!(report.category_progress.len(), 2);
        assert_eq!(report.consistency_score, 29);
    }

    #[test]
    fn empty_report_is_all_zeroes() {
        let report = report::<Utc>(&[], &fixed_now());
        assert_eq!(report.average_score, 0);
        assert_eq!(report.total_questions, 0);
        assert!(report.strengths.is_empty());
        assert!(report.category_progress.is_empty());
        assert_eq!(report.consistency_score, 0);
        assert_eq!(report.daily_activity.len(), 7);
    }
}
