//! Site visit transitions and AMC expiry

use chrono::{DateTime, Months, Utc};

use renocost_types::{AmcPlan, AmcStatus, AmcSubscription, Error, Result, SiteVisit, VisitStatus};

/// Whether a visit may move from `from` to `to`.
///
/// requested -> confirmed | cancelled, confirmed -> completed | cancelled.
pub fn can_transition(from: VisitStatus, to: VisitStatus) -> bool {
    matches!(
        (from, to),
        (VisitStatus::Requested, VisitStatus::Confirmed)
            | (VisitStatus::Requested, VisitStatus::Cancelled)
            | (VisitStatus::Confirmed, VisitStatus::Completed)
            | (VisitStatus::Confirmed, VisitStatus::Cancelled)
    )
}

/// Copy of `visit` in the new status
pub fn transition_visit(visit: &SiteVisit, to: VisitStatus) -> Result<SiteVisit> {
    if !can_transition(visit.status, to) {
        return Err(Error::Validation(format!(
            "site visit {} cannot move from {} to {}",
            visit.id, visit.status, to
        )));
    }
    let mut next = visit.clone();
    next.status = to;
    Ok(next)
}

/// End of the paid coverage period
pub fn amc_end_date(subscription: &AmcSubscription) -> DateTime<Utc> {
    let months = match subscription.plan {
        AmcPlan::Monthly => Months::new(1),
        AmcPlan::Yearly => Months::new(12),
    };
    subscription
        .start_date
        .checked_add_months(months)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Status as of `now`; active subscriptions past their end are expired
pub fn effective_status(subscription: &AmcSubscription, now: DateTime<Utc>) -> AmcStatus {
    match subscription.status {
        AmcStatus::Active if now >= amc_end_date(subscription) => AmcStatus::Expired,
        status => status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_visit_transitions() {
        assert!(can_transition(VisitStatus::Requested, VisitStatus::Confirmed));
        assert!(can_transition(VisitStatus::Confirmed, VisitStatus::Completed));
        assert!(can_transition(VisitStatus::Requested, VisitStatus::Cancelled));
        assert!(!can_transition(VisitStatus::Requested, VisitStatus::Completed));
        assert!(!can_transition(VisitStatus::Completed, VisitStatus::Cancelled));
        assert!(!can_transition(VisitStatus::Cancelled, VisitStatus::Requested));
    }

    #[test]
    fn test_transition_visit_rejects_terminal() {
        let now = Utc::now();
        let visit = SiteVisit::new("12 Lake View".to_string(), now, now);
        let confirmed = transition_visit(&visit, VisitStatus::Confirmed).unwrap();
        assert_eq!(confirmed.status, VisitStatus::Confirmed);
        assert_eq!(confirmed.id, visit.id);

        let done = transition_visit(&confirmed, VisitStatus::Completed).unwrap();
        assert!(matches!(
            transition_visit(&done, VisitStatus::Cancelled),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_monthly_plan_expires_after_a_month() {
        let start = Utc.with_ymd_and_hms(2026, 1, 31, 9, 0, 0).unwrap();
        let sub = AmcSubscription::new(AmcPlan::Monthly, start);
        let end = amc_end_date(&sub);
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 2, 28, 9, 0, 0).unwrap());

        assert_eq!(effective_status(&sub, end - Duration::seconds(1)), AmcStatus::Active);
        assert_eq!(effective_status(&sub, end), AmcStatus::Expired);
    }

    #[test]
    fn test_yearly_plan_and_cancelled_status() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mut sub = AmcSubscription::new(AmcPlan::Yearly, start);
        assert_eq!(
            effective_status(&sub, Utc.with_ymd_and_hms(2026, 5, 31, 0, 0, 0).unwrap()),
            AmcStatus::Active
        );

        sub.status = AmcStatus::Cancelled;
        assert_eq!(
            effective_status(&sub, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
            AmcStatus::Cancelled
        );
    }
}
