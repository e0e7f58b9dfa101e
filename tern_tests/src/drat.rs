//! A small DRAT replay checker, for validating emitted proofs.
//!
//! Each addition in the proof is checked for the reverse-unit-propagation
//! property against the accumulated database. A proof refutes the formula
//! when an addition of the empty clause is reached with every step
//! checked.
//!
//! Deletion records are parsed and ignored. Deletions exist for checker
//! performance only: every clause in the database is entailed by the
//! formula (original, or verified on addition), so checking additions
//! against the undeleted superset remains sound, and sidesteps the usual
//! care needed around deleting clauses that act as reasons.
//!
//! The checker is deliberately simple (quadratic propagation, no watch
//! lists); it exists to cross-check the solver, not to keep up with it.

use std::collections::HashSet;

/// Replay `proof` (text DRAT) against `clauses`. True when the proof
/// derives the empty clause with every addition RUP.
pub fn refutes(clauses: &[Vec<i32>], proof: &str) -> bool {
    let mut db: Vec<Vec<i32>> = clauses.to_vec();

    for line in proof.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("d ") {
            continue;
        }

        let mut lits: Vec<i32> = line
            .split_whitespace()
            .map(|f| f.parse().expect("a DIMACS integer"))
            .collect();
        assert_eq!(lits.pop(), Some(0), "unterminated proof line");

        if !is_rup(&db, &lits) {
            return false;
        }
        if lits.is_empty() {
            return true;
        }
        db.push(lits);
    }

    false
}

/// Whether the addition of `clause` has the reverse-unit-propagation
/// property over `db`: assuming every literal false propagates a conflict.
fn is_rup(db: &[Vec<i32>], clause: &[i32]) -> bool {
    let mut assigned: HashSet<i32> = clause.iter().map(|&l| -l).collect();
    if clause.iter().any(|l| assigned.contains(l)) {
        // The negated clause is itself contradictory (a tautology).
        return true;
    }

    loop {
        let mut assignment_made = false;

        for clause in db {
            let mut unassigned = None;
            let mut satisfied = false;
            let mut unassigned_count = 0;

            for &literal in clause {
                if assigned.contains(&literal) {
                    satisfied = true;
                    break;
                }
                if !assigned.contains(&-literal) {
                    unassigned = Some(literal);
                    unassigned_count += 1;
                }
            }

            if satisfied {
                continue;
            }
            match unassigned_count {
                0 => return true,
                1 => {
                    let unit = unassigned.expect("a counted literal");
                    assigned.insert(unit);
                    assignment_made = true;
                }
                _ => {}
            }
        }

        if !assignment_made {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rup_empty_clause() {
        // p, ¬p derives the empty clause immediately.
        let db = vec![vec![1], vec![-1]];
        assert!(is_rup(&db, &[]));
    }

    #[test]
    fn rup_resolvent() {
        let db = vec![vec![1, 2], vec![-1, 2]];
        assert!(is_rup(&db, &[2]));
        assert!(!is_rup(&db, &[1]));
    }

    #[test]
    fn replay_of_a_tiny_refutation() {
        let formula = vec![vec![1, 2], vec![1, -2], vec![-1, 2], vec![-1, -2]];
        let proof = "1 0\n0\n";
        assert!(refutes(&formula, proof));
    }

    #[test]
    fn replay_rejects_a_bogus_step() {
        let formula = vec![vec![1, 2]];
        let proof = "1 0\n0\n";
        assert!(!refutes(&formula, proof));
    }
}
