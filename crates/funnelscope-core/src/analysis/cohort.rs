use super::{Analyzer, percent, round2};
use crate::model::Session;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Users grouped by the date of their first session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortRow {
    pub cohort_date: NaiveDate,
    pub users: usize,
    pub sessions: usize,
    pub conversions: usize,
    pub revenue: f64,
    pub conversion_rate: f64,
    pub revenue_per_user: f64,
}

pub struct CohortAnalyzer;

#[derive(Default)]
struct Cohort {
    users: HashSet<u64>,
    sessions: usize,
    conversions: usize,
    revenue: f64,
}

impl Analyzer for CohortAnalyzer {
    type Output = Vec<CohortRow>;

    fn analyze(&self, sessions: &[Session]) -> Self::Output {
        let mut first_seen: HashMap<u64, NaiveDate> = HashMap::new();
        for session in sessions {
            let date = session.date();
            first_seen
                .entry(session.user_id)
                .and_modify(|d| *d = (*d).min(date))
                .or_insert(date);
        }

        let mut cohorts: BTreeMap<NaiveDate, Cohort> = BTreeMap::new();
        for session in sessions {
            let Some(&date) = first_seen.get(&session.user_id) else {
                continue;
            };
            let cohort = cohorts.entry(date).or_default();
            cohort.users.insert(session.user_id);
            cohort.sessions += 1;
            cohort.conversions += usize::from(session.completed_purchase);
            cohort.revenue += session.revenue;
        }

        tracing::debug!("Built {} cohorts from {} users", cohorts.len(), first_seen.len());

        cohorts
            .into_iter()
            .map(|(cohort_date, c)| CohortRow {
                cohort_date,
                users: c.users.len(),
                sessions: c.sessions,
                conversions: c.conversions,
                revenue: c.revenue,
                conversion_rate: round2(percent(c.conversions as f64, c.sessions as f64)),
                revenue_per_user: round2(c.revenue / c.users.len() as f64),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{at, session};
    use crate::model::FunnelStage;

    #[test]
    fn test_sessions_follow_first_visit_cohort() {
        let mut a1 = session(1, 1, FunnelStage::Landing);
        a1.timestamp = at(3, 8);
        let mut a2 = session(2, 1, FunnelStage::Purchase);
        a2.timestamp = at(9, 8);
        let mut b1 = session(3, 2, FunnelStage::Purchase);
        b1.timestamp = at(9, 12);

        let rows = CohortAnalyzer.analyze(&[a2, b1, a1]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cohort_date, at(3, 0).date());
        assert_eq!(rows[0].users, 1);
        assert_eq!(rows[0].sessions, 2);
        assert_eq!(rows[0].conversions, 1);
        assert_eq!(rows[0].conversion_rate, 50.0);
        assert_eq!(rows[0].revenue_per_user, 1000.0);

        assert_eq!(rows[1].cohort_date, at(9, 0).date());
        assert_eq!(rows[1].sessions, 1);
    }

    #[test]
    fn test_empty() {
        assert!(CohortAnalyzer.analyze(&[]).is_empty());
    }
}
