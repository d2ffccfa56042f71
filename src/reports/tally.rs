use crate::models::{CandidateTally, CandidateVotes, Election, ElectionTally, Position, PositionTally};
use crate::reports::percentage;
use std::collections::HashMap;

/// Builds the per-position tally for an election.
///
/// Percentages are taken against the expressed preference of each position
/// (all candidate votes plus explicit abstains), not against eligible voters.
/// Candidates are ordered by votes descending; equal counts keep registration
/// order (creation time, then id) so repeated calls render identically.
pub fn calculate_tally(
    election: &Election,
    positions: &[Position],
    candidates: Vec<CandidateVotes>,
    abstains: &HashMap<i64, u64>,
) -> ElectionTally {
    let mut by_position: HashMap<i64, Vec<CandidateVotes>> = HashMap::new();
    for candidate in candidates {
        by_position.entry(candidate.position_id).or_default().push(candidate);
    }

    let positions = positions
        .iter()
        .map(|position| {
            let candidates = by_position.remove(&position.id).unwrap_or_default();
            let abstain_count = abstains.get(&position.id).copied().unwrap_or(0);
            tally_position(position, candidates, abstain_count)
        })
        .collect();

    ElectionTally {
        election_id: election.id,
        election_name: election.name.clone(),
        positions,
    }
}

fn tally_position(position: &Position, mut candidates: Vec<CandidateVotes>, abstain_count: u64) -> PositionTally {
    candidates.sort_by(|a, b| {
        b.vote_count
            .cmp(&a.vote_count)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });

    let total_expressed = candidates.iter().map(|c| c.vote_count).sum::<u64>() + abstain_count;

    let top = candidates.first().map(|c| c.vote_count).unwrap_or(0);
    let leaders = if top > 0 {
        candidates
            .iter()
            .take_while(|c| c.vote_count == top)
            .map(|c| c.candidate_id)
            .collect()
    } else {
        Vec::new()
    };

    let candidates = candidates
        .into_iter()
        .map(|c| CandidateTally {
            candidate_id: c.candidate_id,
            vote_percentage: percentage(c.vote_count, total_expressed),
            student_name: c.student_name,
            vote_count: c.vote_count,
        })
        .collect();

    PositionTally {
        position_id: position.id,
        title: position.title.clone(),
        max_candidates: position.max_candidates,
        candidates,
        abstain_count,
        abstain_percentage: percentage(abstain_count, total_expressed),
        total_expressed,
        leaders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ElectionStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn election() -> Election {
        Election {
            id: 1,
            name: "Student Council 2024".into(),
            election_type: "council".into(),
            starts_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap(),
            status: ElectionStatus::Completed,
            created_by: 1,
        }
    }

    fn position(id: i64, title: &str) -> Position {
        Position { id, election_id: 1, title: title.into(), max_candidates: 5 }
    }

    fn candidate(id: i64, position_id: i64, name: &str, registered_minute: i64, votes: u64) -> CandidateVotes {
        CandidateVotes {
            candidate_id: id,
            position_id,
            student_name: name.into(),
            created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap() + Duration::minutes(registered_minute),
            vote_count: votes,
        }
    }

    #[test]
    fn president_percentages_use_expressed_preference() {
        let positions = vec![position(10, "President")];
        let candidates = vec![candidate(2, 10, "B", 1, 3), candidate(1, 10, "A", 0, 7)];
        let abstains = HashMap::from([(10, 2)]);

        let tally = calculate_tally(&election(), &positions, candidates, &abstains);
        let president = &tally.positions[0];

        assert_eq!(president.total_expressed, 12);
        assert_eq!(president.candidates[0].student_name, "A");
        assert_eq!(president.candidates[0].vote_percentage, 58.33);
        assert_eq!(president.candidates[1].vote_percentage, 25.0);
        assert_eq!(president.abstain_percentage, 16.67);
        assert_eq!(president.leaders, vec![1]);
        assert!(!president.is_tied());
    }

    #[test]
    fn shares_add_up_to_one_hundred() {
        let positions = vec![position(10, "Treasurer")];
        let candidates = vec![
            candidate(1, 10, "A", 0, 5),
            candidate(2, 10, "B", 1, 4),
            candidate(3, 10, "C", 2, 4),
        ];
        let abstains = HashMap::from([(10, 1)]);

        let tally = calculate_tally(&election(), &positions, candidates, &abstains);
        let p = &tally.positions[0];
        let sum: f64 = p.candidates.iter().map(|c| c.vote_percentage).sum::<f64>() + p.abstain_percentage;
        assert!((sum - 100.0).abs() <= 0.05, "sum was {}", sum);
    }

    #[test]
    fn ties_keep_registration_order() {
        let positions = vec![position(10, "Secretary")];
        // Later-registered candidate has the lower id; creation time decides.
        let candidates = vec![
            candidate(1, 10, "Late", 30, 4),
            candidate(2, 10, "Early", 0, 4),
            candidate(3, 10, "Trailing", 5, 1),
        ];

        let first = calculate_tally(&election(), &positions, candidates.clone(), &HashMap::new());
        let order: Vec<i64> = first.positions[0].candidates.iter().map(|c| c.candidate_id).collect();
        assert_eq!(order, vec![2, 1, 3]);
        assert_eq!(first.positions[0].leaders, vec![2, 1]);
        assert!(first.positions[0].is_tied());

        let second = calculate_tally(&election(), &positions, candidates, &HashMap::new());
        assert_eq!(first, second);
    }

    #[test]
    fn empty_position_reports_zero_without_dividing() {
        let positions = vec![position(10, "President"), position(11, "Auditor")];
        let candidates = vec![candidate(1, 11, "Solo", 0, 0)];

        let tally = calculate_tally(&election(), &positions, candidates, &HashMap::new());

        assert!(tally.positions[0].candidates.is_empty());
        assert_eq!(tally.positions[0].total_expressed, 0);
        let solo = &tally.positions[1];
        assert_eq!(solo.candidates[0].vote_percentage, 0.0);
        assert_eq!(solo.abstain_percentage, 0.0);
        assert!(solo.leaders.is_empty());
    }

    #[test]
    fn all_abstain_position() {
        let positions = vec![position(10, "President")];
        let candidates = vec![candidate(1, 10, "A", 0, 0)];
        let abstains = HashMap::from([(10, 4)]);

        let tally = calculate_tally(&election(), &positions, candidates, &abstains);
        assert_eq!(tally.positions[0].abstain_percentage, 100.0);
        assert_eq!(tally.positions[0].candidates[0].vote_percentage, 0.0);
    }
}
