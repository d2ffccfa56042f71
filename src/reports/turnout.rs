use crate::models::{OverallTurnout, ProgramCounts, ProgramTurnout, TurnoutReport};
use crate::reports::percentage;

pub fn calculate_turnout(
    election_id: i64,
    programs: Vec<ProgramCounts>,
    eligible_voters: u64,
    voted: u64,
) -> TurnoutReport {
    let programs = programs
        .into_iter()
        .map(|p| ProgramTurnout {
            turnout_rate: turnout_rate(p.voted_students, p.total_students),
            program_id: p.program_id,
            program_name: p.program_name,
            total_students: p.total_students,
            voted_students: p.voted_students,
        })
        .collect();

    TurnoutReport {
        election_id,
        programs,
        overall: OverallTurnout {
            eligible_voters,
            voted,
            turnout_rate: turnout_rate(voted, eligible_voters),
        },
    }
}

// Clamped to [0, 100].
fn turnout_rate(voted: u64, total: u64) -> f64 {
    percentage(voted.min(total), total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(id: i64, name: &str, total: u64, voted: u64) -> ProgramCounts {
        ProgramCounts {
            program_id: id,
            program_name: name.into(),
            total_students: total,
            voted_students: voted,
        }
    }

    #[test]
    fn science_turnout() {
        let report = calculate_turnout(1, vec![program(1, "Science", 50, 20)], 50, 20);
        assert_eq!(report.programs[0].turnout_rate, 40.0);
        assert_eq!(report.overall.turnout_rate, 40.0);
    }

    #[test]
    fn empty_program_is_zero_not_nan() {
        let report = calculate_turnout(1, vec![program(2, "Arts", 0, 0)], 0, 0);
        assert_eq!(report.programs[0].turnout_rate, 0.0);
        assert_eq!(report.overall.turnout_rate, 0.0);
    }

    #[test]
    fn rates_stay_within_bounds() {
        let programs = vec![
            program(1, "Science", 3, 3),
            program(2, "Business", 7, 2),
            program(3, "Stale", 1, 4),
        ];
        let report = calculate_turnout(1, programs, 11, 9);
        for p in &report.programs {
            assert!((0.0..=100.0).contains(&p.turnout_rate), "{} out of range", p.turnout_rate);
        }
        assert_eq!(report.programs[0].turnout_rate, 100.0);
        assert_eq!(report.programs[1].turnout_rate, 28.57);
        assert_eq!(report.programs[2].turnout_rate, 100.0);
        assert_eq!(report.overall.turnout_rate, 81.82);
    }
}
