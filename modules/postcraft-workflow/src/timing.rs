//! Heuristic posting-time suggestions.
//!
//! Content type picks a slot table per platform, audience region picks the
//! timezone, and regulated topics get a review note in the rationale.

use std::collections::HashSet;
use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use regex::Regex;
use tracing::info;

use postcraft_common::{Platform, PostingTime};

use crate::traits::TimingAdvisor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    BreakingNews,
    Travel,
    Analytical,
    VisualLifestyle,
    Professional,
}

impl ContentType {
    /// First matching keyword group wins; professional is the fallback.
    pub fn detect(combined_lower: &str) -> Self {
        let groups: [(ContentType, &[&str]); 4] = [
            (ContentType::BreakingNews, &["breaking", "alert", "urgent", "just announced", "developing"]),
            (ContentType::Travel, &["travel", "vacation", "destination", "tourism", "flight", "hotel"]),
            (ContentType::Analytical, &["study", "research", "analysis", "data", "report", "survey"]),
            (ContentType::VisualLifestyle, &["photos", "images", "beautiful", "stunning", "lifestyle", "culture"]),
        ];
        groups
            .iter()
            .find(|(_, words)| words.iter().any(|w| combined_lower.contains(w)))
            .map(|(kind, _)| *kind)
            .unwrap_or(ContentType::Professional)
    }

    fn description(&self) -> &'static str {
        match self {
            ContentType::Professional => "Professional insights work best in morning business hours",
            ContentType::BreakingNews => "Breaking news should be posted immediately",
            ContentType::VisualLifestyle => "Visual content performs best during leisure browsing",
            ContentType::Analytical => "Data-driven content works best during professional hours",
            ContentType::Travel => "Travel content engages well on weekends and lunch breaks",
        }
    }

    fn preferred_window(&self, platform: Platform) -> Option<Window> {
        use ContentType::*;
        use Platform::*;
        match (self, platform) {
            (Professional, Linkedin) => Some(Window::ProfessionalMorning),
            (Professional, Twitter) => Some(Window::WeekdaySecondary),
            (BreakingNews, Twitter) => Some(Window::Immediate),
            (VisualLifestyle, Instagram) => Some(Window::WeekdayEvening),
            (Analytical, Linkedin) => Some(Window::TuesdayThursday),
            (Analytical, Twitter) => Some(Window::WeekdayPrimary),
            (Travel, Instagram) => Some(Window::WeekendMorning),
            (Travel, Twitter) => Some(Window::WeekdayPrimary),
            _ => None,
        }
    }
}

/// Named engagement windows with their slot times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Window {
    Immediate,
    WeekdayPrimary,
    WeekdaySecondary,
    Weekend,
    TuesdayThursday,
    OtherWeekdays,
    ProfessionalMorning,
    WeekdayEvening,
    WeekendMorning,
}

impl Window {
    /// Window used when the content type has no preference for the platform.
    fn default_for(platform: Platform, weekday_from_monday: u32) -> Self {
        match platform {
            Platform::Linkedin if (1..=3).contains(&weekday_from_monday) => Window::TuesdayThursday,
            Platform::Linkedin => Window::OtherWeekdays,
            Platform::Instagram if weekday_from_monday >= 5 => Window::WeekendMorning,
            Platform::Instagram => Window::WeekdayEvening,
            Platform::Twitter if weekday_from_monday < 5 => Window::WeekdayPrimary,
            Platform::Twitter => Window::Weekend,
        }
    }

    fn slots(&self) -> &'static [u32] {
        match self {
            Window::Immediate => &[],
            Window::WeekdayPrimary => &[12, 13, 14, 15],
            Window::WeekdaySecondary => &[9],
            Window::Weekend => &[10, 14, 16],
            Window::TuesdayThursday => &[7, 8, 9, 12, 13, 14, 17, 18],
            Window::OtherWeekdays => &[8, 13, 17],
            Window::ProfessionalMorning => &[7, 8, 9],
            Window::WeekdayEvening => &[18, 19, 20, 21],
            Window::WeekendMorning => &[10, 11],
        }
    }

    fn is_weekend(&self) -> bool {
        matches!(self, Window::Weekend | Window::WeekendMorning)
    }
}

fn hour_reason(hour: u32) -> &'static str {
    match hour {
        7 => "Early morning professional browsing",
        8 => "Pre-work engagement peak",
        9 => "Morning commute and coffee break",
        12 => "Lunch break browsing peak",
        13 => "Post-lunch professional activity",
        14 => "Afternoon engagement window",
        15 => "Late afternoon peak",
        17 => "End-of-workday browsing",
        18 => "Evening leisure browsing",
        19 => "Prime evening engagement",
        20 => "Peak evening social time",
        21 => "Late evening browsing",
        _ => "Optimal engagement window",
    }
}

fn word_pattern(words: &[&str]) -> Regex {
    let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Regex::new(&format!(r"(?:^|[^a-z])(?:{})(?:[^a-z]|$)", alternatives.join("|"))).unwrap()
}

static REGIONS: LazyLock<Vec<(Tz, Regex)>> = LazyLock::new(|| {
    vec![
        (
            chrono_tz::US::Eastern,
            word_pattern(&["america", "united states", "usa", "u.s.", "american", "newark", "miami", "california"]),
        ),
        (
            chrono_tz::Europe::London,
            word_pattern(&["europe", "european", "eu", "uk", "britain", "germany", "france", "london"]),
        ),
        (
            chrono_tz::Asia::Singapore,
            word_pattern(&["asia", "asian", "china", "japan", "india", "singapore", "tokyo"]),
        ),
        (
            chrono_tz::Europe::Copenhagen,
            word_pattern(&["greenland", "iceland", "denmark", "norway", "sweden", "finland"]),
        ),
    ]
});

const REGULATED: [(&str, &[&str]); 4] = [
    ("healthcare", &["hospital", "medical", "health", "patient", "doctor", "medicine", "clinical"]),
    ("finance", &["bank", "financial", "investment", "trading", "crypto", "payment", "fintech"]),
    ("aviation", &["airline", "airport", "flight", "aircraft", "aviation", "faa"]),
    ("pharma", &["drug", "pharmaceutical", "medication", "treatment", "therapy"]),
];

fn regulated_industry(combined_lower: &str) -> Option<&'static str> {
    REGULATED
        .iter()
        .find(|(_, words)| words.iter().any(|w| combined_lower.contains(w)))
        .map(|(industry, _)| *industry)
}

type SlotKey = (NaiveDate, u32, u32);

fn slot_key(dt: &DateTime<Tz>) -> SlotKey {
    (dt.date_naive(), dt.hour(), dt.minute() / 30)
}

fn localize(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Claim the slot for `time`, pushing it back when another suggestion
/// already sits in the same 30-minute block.
fn reserve(used: &mut HashSet<SlotKey>, time: DateTime<Tz>, platform: Platform) -> DateTime<Tz> {
    let mut time = time;
    if used.contains(&slot_key(&time)) {
        let stagger = if platform == Platform::Twitter { 1 } else { 2 };
        time += Duration::hours(stagger);
    }
    used.insert(slot_key(&time));
    time
}

pub struct HeuristicTimingAdvisor {
    default_tz: Tz,
}

impl HeuristicTimingAdvisor {
    pub fn new(default_tz: Tz) -> Self {
        Self { default_tz }
    }

    pub fn audience_timezone(&self, combined_lower: &str) -> Tz {
        REGIONS
            .iter()
            .find(|(_, pattern)| pattern.is_match(combined_lower))
            .map(|(tz, _)| *tz)
            .unwrap_or(self.default_tz)
    }

    /// Suggestions relative to `now`, sorted by time and capped at six
    /// (three for breaking news).
    pub fn suggest_at(
        &self,
        platforms: &[Platform],
        text: &str,
        topic_hint: &str,
        now: DateTime<Utc>,
    ) -> Vec<PostingTime> {
        let combined = format!("{text} {topic_hint}").to_lowercase();
        let content_type = ContentType::detect(&combined);
        let tz = self.audience_timezone(&combined);
        let regulated = regulated_industry(&combined);
        let local_now = now.with_timezone(&tz);
        let weekday = local_now.weekday().num_days_from_monday();

        let note = regulated
            .map(|industry| format!(" [COMPLIANCE REVIEW REQUIRED: {} content]", industry.to_uppercase()))
            .unwrap_or_default();

        let mut used: HashSet<SlotKey> = HashSet::new();
        let mut suggestions: Vec<(DateTime<Tz>, PostingTime)> = Vec::new();

        for &platform in platforms {
            let window = content_type
                .preferred_window(platform)
                .unwrap_or_else(|| Window::default_for(platform, weekday));

            if window == Window::Immediate {
                let time = local_now + Duration::minutes(5);
                suggestions.push((
                    time,
                    PostingTime {
                        platform,
                        local_datetime: time.fixed_offset(),
                        rationale: format!("Breaking news - post immediately for maximum engagement{note}"),
                    },
                ));
                continue;
            }

            for &hour in window.slots().iter().take(2) {
                let Some(slot) = local_now.date_naive().and_hms_opt(hour, 0, 0) else {
                    continue;
                };
                let mut naive = slot;
                if window.is_weekend() && weekday < 5 {
                    naive += Duration::days(i64::from(5 - weekday));
                } else if naive <= local_now.naive_local() {
                    naive += Duration::days(1);
                }

                let time = reserve(&mut used, localize(tz, naive), platform);
                suggestions.push((
                    time,
                    PostingTime {
                        platform,
                        local_datetime: time.fixed_offset(),
                        rationale: format!("{} - {}{note}", hour_reason(hour), content_type.description()),
                    },
                ));
            }
        }

        suggestions.sort_by_key(|(time, _)| *time);
        let cap = if content_type == ContentType::BreakingNews { 3 } else { 6 };
        let out: Vec<PostingTime> = suggestions.into_iter().take(cap).map(|(_, t)| t).collect();
        info!(
            suggestions = out.len(),
            content_type = ?content_type,
            timezone = %tz,
            "Posting times suggested"
        );
        out
    }
}

#[async_trait]
impl TimingAdvisor for HeuristicTimingAdvisor {
    async fn suggest_times(
        &self,
        platforms: &[Platform],
        text: &str,
        topic_hint: &str,
    ) -> Result<Vec<PostingTime>> {
        Ok(self.suggest_at(platforms, text, topic_hint, Utc::now()))
    }
}
