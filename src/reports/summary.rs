use crate::models::{Summary, SummaryCounts};
use crate::reports::round2;

pub fn calculate_summary(election_id: Option<i64>, counts: SummaryCounts) -> Summary {
    let avg_votes_per_session = if counts.completed_sessions == 0 {
        0.0
    } else {
        round2(counts.total_votes as f64 / counts.completed_sessions as f64)
    };

    Summary {
        election_id,
        total_voters: counts.total_voters,
        total_votes: counts.total_votes,
        total_positions: counts.total_positions,
        total_candidates: counts.total_candidates,
        eligible_voters: counts.eligible_voters,
        abstains: counts.abstains,
        completed_sessions: counts.completed_sessions,
        avg_votes_per_session,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sessions_means_zero_average() {
        let counts = SummaryCounts { total_positions: 3, total_candidates: 7, eligible_voters: 120, ..Default::default() };
        let summary = calculate_summary(Some(4), counts);
        assert_eq!(summary.total_voters, 0);
        assert_eq!(summary.avg_votes_per_session, 0.0);
        assert_eq!(summary.eligible_voters, 120);
    }

    #[test]
    fn average_is_rounded() {
        let counts = SummaryCounts { total_votes: 10, completed_sessions: 3, total_voters: 3, ..Default::default() };
        assert_eq!(calculate_summary(None, counts).avg_votes_per_session, 3.33);
    }
}
