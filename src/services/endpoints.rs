/// How an endpoint is filtered in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// `start_date` / `end_date` calendar dates.
    Date,
    /// `start_datetime` / `end_datetime` ISO 8601 timestamps.
    DateTime,
    /// No range parameters.
    Unbounded,
}

impl RangeKind {
    pub fn param_names(self) -> Option<(&'static str, &'static str)> {
        match self {
            RangeKind::Date => Some(("start_date", "end_date")),
            RangeKind::DateTime => Some(("start_datetime", "end_datetime")),
            RangeKind::Unbounded => None,
        }
    }
}

/// Read-only resources of the Oura v2 user collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    PersonalInfo,
    DailySleep,
    DailyActivity,
    DailyReadiness,
    DailyStress,
    DailySpo2,
    DailyResilience,
    DailyCardiovascularAge,
    Sleep,
    SleepTime,
    Workout,
    Session,
    HeartRate,
    EnhancedTag,
    RingConfiguration,
    RestModePeriod,
    Vo2Max,
}

impl Endpoint {
    pub const ALL: &'static [Endpoint] = &[
        Endpoint::PersonalInfo,
        Endpoint::DailySleep,
        Endpoint::DailyActivity,
        Endpoint::DailyReadiness,
        Endpoint::DailyStress,
        Endpoint::DailySpo2,
        Endpoint::DailyResilience,
        Endpoint::DailyCardiovascularAge,
        Endpoint::Sleep,
        Endpoint::SleepTime,
        Endpoint::Workout,
        Endpoint::Session,
        Endpoint::HeartRate,
        Endpoint::EnhancedTag,
        Endpoint::RingConfiguration,
        Endpoint::RestModePeriod,
        Endpoint::Vo2Max,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::PersonalInfo => "/v2/usercollection/personal_info",
            Endpoint::DailySleep => "/v2/usercollection/daily_sleep",
            Endpoint::DailyActivity => "/v2/usercollection/daily_activity",
            Endpoint::DailyReadiness => "/v2/usercollection/daily_readiness",
            Endpoint::DailyStress => "/v2/usercollection/daily_stress",
            Endpoint::DailySpo2 => "/v2/usercollection/daily_spo2",
            Endpoint::DailyResilience => "/v2/usercollection/daily_resilience",
            Endpoint::DailyCardiovascularAge => "/v2/usercollection/daily_cardiovascular_age",
            Endpoint::Sleep => "/v2/usercollection/sleep",
            Endpoint::SleepTime => "/v2/usercollection/sleep_time",
            Endpoint::Workout => "/v2/usercollection/workout",
            Endpoint::Session => "/v2/usercollection/session",
            Endpoint::HeartRate => "/v2/usercollection/heartrate",
            Endpoint::EnhancedTag => "/v2/usercollection/enhanced_tag",
            Endpoint::RingConfiguration => "/v2/usercollection/ring_configuration",
            Endpoint::RestModePeriod => "/v2/usercollection/rest_mode_period",
            // upstream spells this path with a capital O
            Endpoint::Vo2Max => "/v2/usercollection/vO2_max",
        }
    }

    pub fn range(self) -> RangeKind {
        match self {
            Endpoint::PersonalInfo | Endpoint::RingConfiguration => RangeKind::Unbounded,
            Endpoint::HeartRate => RangeKind::DateTime,
            _ => RangeKind::Date,
        }
    }

    /// Every endpoint except personal info answers with a
    /// `{"data": [...], "next_token": ...}` envelope.
    pub fn paginated(self) -> bool {
        !matches!(self, Endpoint::PersonalInfo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn paths_are_unique_and_versioned() {
        let paths: HashSet<&str> = Endpoint::ALL.iter().map(|e| e.path()).collect();
        assert_eq!(paths.len(), Endpoint::ALL.len());
        assert!(paths.iter().all(|p| p.starts_with("/v2/usercollection/")));
    }

    #[test]
    fn only_personal_info_is_single_object() {
        let single: Vec<_> = Endpoint::ALL.iter().filter(|e| !e.paginated()).collect();
        assert_eq!(single, vec![&Endpoint::PersonalInfo]);
        assert_eq!(Endpoint::HeartRate.range(), RangeKind::DateTime);
        assert_eq!(Endpoint::RingConfiguration.range().param_names(), None);
    }
}
