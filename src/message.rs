//! Text messages sent to chats, rendered from templates in `assets/messages`.

use chrono::DateTime;
use chrono::FixedOffset;
use chrono::Utc;
use minijinja::Environment;
use minijinja::context;

use crate::reminder::ReminderKind;
use crate::source::Fixture;

const TEMPLATES: [(&str, &str); 9] = [
    (
        "day_before.txt",
        include_str!("../assets/messages/day_before.txt"),
    ),
    (
        "hour_before.txt",
        include_str!("../assets/messages/hour_before.txt"),
    ),
    ("result.txt", include_str!("../assets/messages/result.txt")),
    (
        "next_match.txt",
        include_str!("../assets/messages/next_match.txt"),
    ),
    (
        "subscribed.txt",
        include_str!("../assets/messages/subscribed.txt"),
    ),
    (
        "already_subscribed.txt",
        include_str!("../assets/messages/already_subscribed.txt"),
    ),
    (
        "no_fixture.txt",
        include_str!("../assets/messages/no_fixture.txt"),
    ),
    (
        "fetch_failed.txt",
        include_str!("../assets/messages/fetch_failed.txt"),
    ),
    ("error.txt", include_str!("../assets/messages/error.txt")),
];

pub struct MessageFormatter {
    env: Environment<'static>,
    timezone: FixedOffset,
    timezone_label: String,
    team_name: String,
}

impl MessageFormatter {
    pub fn new(
        timezone: FixedOffset,
        timezone_label: impl Into<String>,
        team_name: impl Into<String>,
    ) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self {
            env,
            timezone,
            timezone_label: timezone_label.into(),
            team_name: team_name.into(),
        })
    }

    /// Kickoff time as `HH:MM` in the display timezone.
    pub fn local_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.timezone).format("%H:%M").to_string()
    }

    /// Kickoff date as `YYYY-MM-DD` in the display timezone.
    pub fn local_date(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.timezone)
            .format("%Y-%m-%d")
            .to_string()
    }

    pub fn reminder(&self, kind: ReminderKind, fixture: &Fixture) -> Result<String, minijinja::Error> {
        let template = match kind {
            ReminderKind::DayBefore => "day_before.txt",
            ReminderKind::HourBefore => "hour_before.txt",
            ReminderKind::Result => "result.txt",
        };
        self.render_fixture(template, fixture)
    }

    pub fn next_match(&self, fixture: &Fixture) -> Result<String, minijinja::Error> {
        self.render_fixture("next_match.txt", fixture)
    }

    pub fn subscribed(&self, newly: bool) -> Result<String, minijinja::Error> {
        let template = if newly {
            "subscribed.txt"
        } else {
            "already_subscribed.txt"
        };
        self.env
            .get_template(template)?
            .render(context! { team => &self.team_name })
    }

    pub fn no_fixture(&self) -> Result<String, minijinja::Error> {
        self.env.get_template("no_fixture.txt")?.render(context! {})
    }

    pub fn fetch_failed(&self, ref_id: &str) -> Result<String, minijinja::Error> {
        self.env
            .get_template("fetch_failed.txt")?
            .render(context! { ref_id => ref_id })
    }

    pub fn error(&self, ref_id: &str) -> Result<String, minijinja::Error> {
        self.env
            .get_template("error.txt")?
            .render(context! { ref_id => ref_id })
    }

    fn render_fixture(&self, template: &str, fixture: &Fixture) -> Result<String, minijinja::Error> {
        self.env.get_template(template)?.render(context! {
            team => &self.team_name,
            title => &fixture.title,
            home => &fixture.home,
            away => &fixture.away,
            score => &fixture.score,
            date => self.local_date(fixture.kickoff),
            time => self.local_time(fixture.kickoff),
            tz_label => &self.timezone_label,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::source::FixtureStatus;

    fn formatter() -> MessageFormatter {
        let tehran = FixedOffset::east_opt(3 * 3600 + 30 * 60).unwrap();
        MessageFormatter::new(tehran, "Iran", "Esteghlal").unwrap()
    }

    fn fixture() -> Fixture {
        // 15:00 UTC is 18:30 in Tehran
        let kickoff = Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap();
        Fixture::between("1", "Esteghlal", "Persepolis", kickoff)
    }

    #[test]
    fn test_day_before() {
        let text = formatter()
            .reminder(ReminderKind::DayBefore, &fixture())
            .unwrap();
        assert_eq!(text, "⏳ Tomorrow at 18:30 (Iran)\nEsteghlal vs Persepolis");
    }

    #[test]
    fn test_hour_before() {
        let text = formatter()
            .reminder(ReminderKind::HourBefore, &fixture())
            .unwrap();
        assert_eq!(
            text,
            "🔥 One hour to kickoff!\nEsteghlal vs Persepolis\n🕒 18:30 (Iran)"
        );
    }

    #[test]
    fn test_result_with_and_without_score() {
        let finished = fixture()
            .with_status(FixtureStatus::Finished)
            .with_score(3, 2);
        let text = formatter()
            .reminder(ReminderKind::Result, &finished)
            .unwrap();
        assert_eq!(text, "🏁 Full time\nEsteghlal 3 - 2 Persepolis");

        let text = formatter()
            .reminder(
                ReminderKind::Result,
                &fixture().with_status(FixtureStatus::Finished),
            )
            .unwrap();
        assert_eq!(text, "🏁 Full time\nEsteghlal vs Persepolis");
    }

    #[test]
    fn test_next_match_crosses_midnight() {
        let late = Fixture::new(
            "2",
            "Esteghlal - Sepahan",
            Utc.with_ymd_and_hms(2025, 3, 1, 21, 0, 0).unwrap(),
        );
        let text = formatter().next_match(&late).unwrap();
        assert_eq!(
            text,
            "⚽ Next Esteghlal match:\n\nEsteghlal - Sepahan\n🗓 2025-03-02\n⏰ 00:30 (Iran)"
        );
    }

    #[test]
    fn test_subscribe_replies() {
        let f = formatter();
        assert!(f.subscribed(true).unwrap().contains("reminders are on"));
        assert!(f.subscribed(false).unwrap().contains("already"));
        assert!(f.fetch_failed("abcd1234").unwrap().ends_with("(ref: abcd1234)"));
    }
}
