use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};

pub const BOOST_DURATION_MINUTES: i64 = 30;
pub const PAID_TIER_DURATION_DAYS: i64 = 30;
pub const STREAK_BONUS_LIKES: i32 = 5;
pub const WEEKLY_STREAK_BONUS_LIKES: i32 = 10;
const STREAK_WEEK: i32 = 7;

pub fn boost_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(BOOST_DURATION_MINUTES)
}

pub fn paid_tier_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(PAID_TIER_DURATION_DAYS)
}

/// Most recent midnight in the quota time zone, expressed in UTC.
pub fn last_local_midnight(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local_date = now.with_timezone(&offset).date_naive();
    local_date
        .and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .map(|midnight| midnight.with_timezone(&Utc))
        .unwrap_or(now)
}

/// Calendar days between two instants in the quota time zone. Never negative.
pub fn calendar_days_between(
    earlier: DateTime<Utc>,
    later: DateTime<Utc>,
    offset: FixedOffset,
) -> i64 {
    let from = earlier.with_timezone(&offset).date_naive();
    let to = later.with_timezone(&offset).date_naive();
    (to - from).num_days().max(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakOutcome {
    pub streak_days: i32,
    pub bonus_likes: i32,
}

/// Streak transition for a login at `now`. `None` means the login happened on
/// the same calendar day and nothing changes.
pub fn evaluate_login_streak(
    streak_days: i32,
    last_login: DateTime<Utc>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Option<StreakOutcome> {
    match calendar_days_between(last_login, now, offset) {
        0 => None,
        1 => {
            let streak_days = streak_days.max(0) + 1;
            let mut bonus_likes = STREAK_BONUS_LIKES;
            if streak_days % STREAK_WEEK == 0 {
                bonus_likes += WEEKLY_STREAK_BONUS_LIKES;
            }
            Some(StreakOutcome {
                streak_days,
                bonus_likes,
            })
        }
        _ => Some(StreakOutcome {
            streak_days: 1,
            bonus_likes: 0,
        }),
    }
}
