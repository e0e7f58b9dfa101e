/*!
A stochastic local-search engine, used as a phase oracle.

The engine implements configuration checking with aspiration (CCA) and
smoothed clause weighting over the problem clauses, rebuilt from the level-0
simplified formula each time a walk runs.

Flip selection has three levels:

1. **Greedy**: among variables whose flip decreases the weighted unsat
   count *and* whose configuration changed since their last flip, the
   highest score wins, ties to the longest-unflipped.
2. **Aspiration**: otherwise, a variable in an unsatisfied clause whose
   score beats the average clause weight may be flipped anyway.
3. **Diversification**: otherwise clause weights are bumped and the walk
   flips the most promising variable of a random unsatisfied clause.

Weights grow on every diversification step; once the average passes a
threshold each weight is smoothed towards the average
(`w ← w·p + ave·q`, floored at one) and scores are rebuilt.

Every step is charged to a `mems` budget so a walk ends within a bounded
number of operations whether or not it improves. The walk's best
assignment feeds the target-phase vector; a walk reaching zero unsatisfied
clauses ends the whole solve, with the assignment exposed as the model.
After an unsuccessful walk the variables of the heaviest clauses get their
VSIDS activity bumped, capped at 100 variables across 100 clauses.
*/

use crate::generic::xorshift::Xorshift128;
use crate::misc::log::targets;
use crate::solver::Solver;
use crate::structures::atom::Atom;

/// A literal as the walker sees it: a 1-based variable and a sense.
#[derive(Clone, Copy)]
struct WalkLit {
    var: usize,
    sense: bool,
}

/// The walker. Variables are indexed 1..=num_vars; index 0 is virtual.
#[derive(Default)]
pub(crate) struct LocalSearch {
    num_vars: usize,
    num_clauses: usize,

    clause_lits: Vec<Vec<WalkLit>>,
    var_lits: Vec<Vec<(usize, bool)>>,

    weight: Vec<i64>,
    sat_count: Vec<u32>,
    sat_var: Vec<usize>,

    score: Vec<i64>,
    time_stamp: Vec<u64>,
    conf_change: Vec<bool>,
    neighbors: Vec<Vec<usize>>,

    unsat_stack: Vec<usize>,
    index_in_unsat: Vec<usize>,
    unsatvar_stack: Vec<usize>,
    index_in_unsatvar: Vec<usize>,
    unsat_app_count: Vec<u32>,

    goodvar_stack: Vec<usize>,
    already_in_goodvar: Vec<bool>,

    cur_soln: Vec<bool>,
    best_soln: Vec<bool>,
    best_unsat: usize,
    improved: bool,
    this_try_best: usize,

    aspiration_active: bool,
    mems: u64,
    mems_limit: u64,
    max_tries: usize,
    no_improve_steps: i64,
    step: u64,
    pub(crate) flips: u64,

    ave_weight: i64,
    delta_total_weight: i64,
    threshold: i64,
    p_scale: f64,
    q_scale: f64,
    scale_ave: i64,
}

impl LocalSearch {
    /// Rebuild the instance from the solver's problem clauses, dropping
    /// literals settled at level 0.
    pub(crate) fn build(&mut self, solver: &Solver) {
        self.num_vars = solver.atom_count();
        self.num_clauses = 0;
        self.aspiration_active = true;
        self.mems = 0;
        self.mems_limit = 25_000_000;
        self.max_tries = 100;
        self.no_improve_steps = 200_000;
        self.threshold = 50;
        self.p_scale = 0.3;
        self.q_scale = 0.7;
        self.ave_weight = 1;
        self.delta_total_weight = 0;
        self.step = 0;
        self.improved = false;

        self.clause_lits.clear();
        'clauses: for &cref in &solver.clauses {
            let mut lits = Vec::new();
            for &literal in solver.ca.lits(cref) {
                if let Some(value) = solver.value_literal(literal) {
                    if solver.level(literal.atom()) == 0 {
                        if value {
                            continue 'clauses;
                        }
                        continue;
                    }
                }
                lits.push(WalkLit {
                    var: literal.atom() + 1,
                    sense: literal.polarity(),
                });
            }
            self.clause_lits.push(lits);
            self.num_clauses += 1;
        }

        let vars = self.num_vars + 1;
        self.var_lits = vec![Vec::new(); vars];
        for (c, lits) in self.clause_lits.iter().enumerate() {
            for lit in lits {
                self.var_lits[lit.var].push((c, lit.sense));
            }
        }

        self.weight = vec![1; self.num_clauses];
        self.sat_count = vec![0; self.num_clauses];
        self.sat_var = vec![0; self.num_clauses];
        self.index_in_unsat = vec![0; self.num_clauses];
        self.unsat_stack = Vec::with_capacity(self.num_clauses);

        self.score = vec![0; vars];
        self.time_stamp = vec![0; vars];
        self.conf_change = vec![true; vars];
        self.index_in_unsatvar = vec![0; vars];
        self.unsat_app_count = vec![0; vars];
        self.unsatvar_stack = Vec::with_capacity(vars);
        self.goodvar_stack = Vec::with_capacity(vars);
        self.already_in_goodvar = vec![false; vars];
        self.cur_soln = vec![false; vars];
        self.best_soln = vec![false; vars];
        self.best_unsat = self.num_clauses;

        self.build_neighbor_relation();

        self.scale_ave = ((self.threshold + 1) as f64 * self.q_scale) as i64;
    }

    fn build_neighbor_relation(&mut self) {
        let vars = self.num_vars + 1;
        self.neighbors = vec![Vec::new(); vars];
        let mut flag = vec![false; vars];

        for v in 1..=self.num_vars {
            flag[v] = true;
            for &(c, _) in &self.var_lits[v] {
                for lit in &self.clause_lits[c] {
                    if !flag[lit.var] {
                        flag[lit.var] = true;
                        self.neighbors[v].push(lit.var);
                    }
                }
            }
            flag[v] = false;
            for &n in &self.neighbors[v] {
                flag[n] = false;
            }
        }
    }

    /// Run the walk. True means every clause is satisfied by
    /// [solution](LocalSearch::solution).
    pub(crate) fn run(&mut self, rng: &mut Xorshift128, target: &[Option<bool>]) -> bool {
        for tries in 0..=self.max_tries {
            self.init(tries, target, rng);
            if !self.unsat_stack.is_empty() {
                self.local_search(rng);
            }
            if self.unsat_stack.is_empty() {
                return true;
            }
            if self.mems > self.mems_limit {
                break;
            }
        }
        false
    }

    fn init(&mut self, tries: usize, target: &[Option<bool>], rng: &mut Xorshift128) {
        for w in self.weight.iter_mut() {
            *w = 1;
        }
        self.unsat_stack.clear();
        self.unsatvar_stack.clear();

        if tries == 0 {
            for v in 1..=self.num_vars {
                self.cur_soln[v] = match target[v - 1] {
                    None => rng.next_double() < 2.0,
                    Some(polarity) => polarity,
                };
            }
        } else {
            for v in 1..=self.num_vars {
                self.cur_soln[v] = rng.next_double() < 2.0;
            }
        }

        for v in 1..=self.num_vars {
            self.time_stamp[v] = 0;
            self.conf_change[v] = true;
            self.unsat_app_count[v] = 0;
        }

        for c in 0..self.num_clauses {
            self.sat_count[c] = 0;
            for i in 0..self.clause_lits[c].len() {
                let lit = self.clause_lits[c][i];
                if self.cur_soln[lit.var] == lit.sense {
                    self.sat_count[c] += 1;
                    self.sat_var[c] = lit.var;
                }
            }
            if self.sat_count[c] == 0 {
                self.unsat(c);
            }
        }

        for v in 1..=self.num_vars {
            self.score[v] = 0;
            for i in 0..self.var_lits[v].len() {
                let (c, sense) = self.var_lits[v][i];
                if self.sat_count[c] == 0 {
                    self.score[v] += 1;
                } else if self.sat_count[c] == 1 && sense == self.cur_soln[v] {
                    self.score[v] -= 1;
                }
            }
        }

        self.goodvar_stack.clear();
        for v in 1..=self.num_vars {
            if self.score[v] > 0 {
                self.already_in_goodvar[v] = true;
                self.goodvar_stack.push(v);
            } else {
                self.already_in_goodvar[v] = false;
            }
        }

        self.time_stamp[0] = 0;
        self.this_try_best = self.unsat_stack.len();
    }

    fn local_search(&mut self, rng: &mut Xorshift128) {
        let mut notime = 1 + self.no_improve_steps;
        loop {
            notime -= 1;
            if notime == 0 {
                return;
            }
            self.step += 1;

            let flipvar = self.pick_var(rng);
            self.flip(flipvar);
            self.flips += 1;
            self.time_stamp[flipvar] = self.step;

            if self.unsat_stack.len() < self.this_try_best {
                self.this_try_best = self.unsat_stack.len();
                notime = 1 + self.no_improve_steps;
            }

            if self.best_unsat > self.unsat_stack.len() {
                self.best_unsat = self.unsat_stack.len();
                self.best_soln.copy_from_slice(&self.cur_soln);
                self.improved = true;
            }

            if self.unsat_stack.is_empty() {
                return;
            }
        }
    }

    fn pick_var(&mut self, rng: &mut Xorshift128) -> usize {
        self.mems += (self.num_vars / 8) as u64;

        // Greedy: the best configuration-changed decreasing variable.
        if !self.goodvar_stack.is_empty() {
            let mut best_var = self.goodvar_stack[0];
            for i in 1..self.goodvar_stack.len() {
                let v = self.goodvar_stack[i];
                if self.score[v] > self.score[best_var]
                    || (self.score[v] == self.score[best_var]
                        && self.time_stamp[v] < self.time_stamp[best_var])
                {
                    best_var = v;
                }
            }
            return best_var;
        }

        // Aspiration: a significant decreasing variable in an unsat clause.
        if self.aspiration_active {
            let mut best_var = 0;
            let mut i = 0;
            while i < self.unsatvar_stack.len() {
                if self.score[self.unsatvar_stack[i]] > self.ave_weight {
                    best_var = self.unsatvar_stack[i];
                    break;
                }
                i += 1;
            }
            i += 1;
            while i < self.unsatvar_stack.len() {
                let v = self.unsatvar_stack[i];
                if self.score[v] > self.score[best_var]
                    || (self.score[v] == self.score[best_var]
                        && self.time_stamp[v] < self.time_stamp[best_var])
                {
                    best_var = v;
                }
                i += 1;
            }
            if best_var != 0 {
                return best_var;
            }
        }

        // Diversification: reweight, then walk a random unsat clause.
        self.update_clause_weights();

        let c = self.unsat_stack[rng.below(self.unsat_stack.len())];
        let mut best_var = self.clause_lits[c][0].var;
        for k in 1..self.clause_lits[c].len() {
            let v = self.clause_lits[c][k].var;
            if self.unsat_app_count[v] > self.unsat_app_count[best_var] {
                best_var = v;
            } else if self.unsat_app_count[v] == self.unsat_app_count[best_var]
                && (self.score[v] > self.score[best_var]
                    || (self.score[v] == self.score[best_var]
                        && self.time_stamp[v] < self.time_stamp[best_var]))
            {
                best_var = v;
            }
        }
        best_var
    }

    fn flip(&mut self, flipvar: usize) {
        self.cur_soln[flipvar] = !self.cur_soln[flipvar];

        let org_score = self.score[flipvar];

        for i in 0..self.var_lits[flipvar].len() {
            let (c, sense) = self.var_lits[flipvar][i];
            self.mems += 1;

            if self.cur_soln[flipvar] == sense {
                self.sat_count[c] += 1;
                if self.sat_count[c] == 2 {
                    // The sole satisfier regains its freedom.
                    self.score[self.sat_var[c]] += self.weight[c];
                } else if self.sat_count[c] == 1 {
                    self.sat_var[c] = flipvar;
                    for k in 0..self.clause_lits[c].len() {
                        let v = self.clause_lits[c][k].var;
                        self.score[v] -= self.weight[c];
                    }
                    self.sat(c);
                }
            } else {
                self.sat_count[c] -= 1;
                if self.sat_count[c] == 1 {
                    for k in 0..self.clause_lits[c].len() {
                        let lit = self.clause_lits[c][k];
                        if lit.sense == self.cur_soln[lit.var] {
                            self.score[lit.var] -= self.weight[c];
                            self.sat_var[c] = lit.var;
                            break;
                        }
                    }
                } else if self.sat_count[c] == 0 {
                    for k in 0..self.clause_lits[c].len() {
                        let v = self.clause_lits[c][k].var;
                        self.score[v] += self.weight[c];
                    }
                    self.unsat(c);
                }
            }
        }

        self.score[flipvar] = -org_score;

        self.conf_change[flipvar] = false;

        // Drop stale entries from the good-variable stack.
        self.mems += (self.goodvar_stack.len() / 4) as u64;
        let mut index = self.goodvar_stack.len();
        while index > 0 {
            index -= 1;
            let v = self.goodvar_stack[index];
            if self.score[v] <= 0 {
                self.goodvar_stack.swap_remove(index);
                self.already_in_goodvar[v] = false;
            }
        }

        // Neighbours change configuration, possibly becoming good.
        let mut walked = 0u64;
        for i in 0..self.neighbors[flipvar].len() {
            let v = self.neighbors[flipvar][i];
            walked += 1;
            self.conf_change[v] = true;
            if self.score[v] > 0 && !self.already_in_goodvar[v] {
                self.goodvar_stack.push(v);
                self.already_in_goodvar[v] = true;
            }
        }
        self.mems += walked / 4;
    }

    fn update_clause_weights(&mut self) {
        for i in 0..self.unsat_stack.len() {
            self.weight[self.unsat_stack[i]] += 1;
        }

        for i in 0..self.unsatvar_stack.len() {
            let v = self.unsatvar_stack[i];
            self.score[v] += self.unsat_app_count[v] as i64;
            if self.score[v] > 0 && self.conf_change[v] && !self.already_in_goodvar[v] {
                self.goodvar_stack.push(v);
                self.already_in_goodvar[v] = true;
            }
        }

        self.delta_total_weight += self.unsat_stack.len() as i64;
        if self.delta_total_weight >= self.num_clauses as i64 {
            self.ave_weight += 1;
            self.delta_total_weight -= self.num_clauses as i64;

            if self.ave_weight > self.threshold {
                self.smooth_clause_weights();
            }
        }
    }

    fn smooth_clause_weights(&mut self) {
        let mut new_total_weight = 0;

        for v in 1..=self.num_vars {
            self.score[v] = 0;
        }

        self.mems += self.num_clauses as u64;
        for c in 0..self.num_clauses {
            self.weight[c] = (self.weight[c] as f64 * self.p_scale) as i64 + self.scale_ave;
            if self.weight[c] < 1 {
                self.weight[c] = 1;
            }
            new_total_weight += self.weight[c];

            if self.sat_count[c] == 0 {
                for k in 0..self.clause_lits[c].len() {
                    let v = self.clause_lits[c][k].var;
                    self.score[v] += self.weight[c];
                }
            } else if self.sat_count[c] == 1 {
                self.score[self.sat_var[c]] -= self.weight[c];
            }
        }

        self.ave_weight = new_total_weight / self.num_clauses as i64;
    }

    fn unsat(&mut self, clause: usize) {
        self.index_in_unsat[clause] = self.unsat_stack.len();
        self.unsat_stack.push(clause);

        for i in 0..self.clause_lits[clause].len() {
            let v = self.clause_lits[clause][i].var;
            self.unsat_app_count[v] += 1;
            if self.unsat_app_count[v] == 1 {
                self.index_in_unsatvar[v] = self.unsatvar_stack.len();
                self.unsatvar_stack.push(v);
            }
        }
    }

    fn sat(&mut self, clause: usize) {
        // The satisfied clause's slot is reused for the stack's last entry.
        let last_unsat = self.unsat_stack.pop().expect("clause was on the stack");
        if last_unsat != clause {
            let index = self.index_in_unsat[clause];
            self.unsat_stack[index] = last_unsat;
            self.index_in_unsat[last_unsat] = index;
        }

        for i in 0..self.clause_lits[clause].len() {
            let v = self.clause_lits[clause][i].var;
            self.unsat_app_count[v] -= 1;
            if self.unsat_app_count[v] == 0 {
                let last_var = self.unsatvar_stack.pop().expect("var was on the stack");
                if last_var != v {
                    let index = self.index_in_unsatvar[v];
                    self.unsatvar_stack[index] = last_var;
                    self.index_in_unsatvar[last_var] = index;
                }
            }
        }
    }

    /// The satisfying assignment, 0-indexed by atom. Only meaningful after
    /// [run](LocalSearch::run) returned true.
    pub(crate) fn solution(&self) -> Vec<bool> {
        self.cur_soln[1..].to_vec()
    }

    /// The best assignment seen, 0-indexed by atom, if any step improved.
    pub(crate) fn best_assignment(&self) -> Option<Vec<bool>> {
        if self.improved {
            Some(self.best_soln[1..].to_vec())
        } else {
            None
        }
    }

    /// Atoms of the heaviest clauses, for activity bumping after a walk
    /// that found no model. At most 100 atoms across at most 100 clauses,
    /// selected by a bounded scan per clause.
    pub(crate) fn bump_candidates(&self) -> Vec<Atom> {
        let mut candidates = Vec::new();
        let mut seen_clauses = vec![false; self.num_clauses];
        let mut seen_vars = vec![0u32; self.num_vars + 1];
        let mut picked = 0usize;

        loop {
            if picked >= 100 || picked > self.num_vars {
                return candidates;
            }

            let mut best = -1;
            let mut clause_to_bump = None;
            for c in 0..self.num_clauses {
                if seen_clauses[c] {
                    continue;
                }
                if self.weight[c] > best {
                    best = self.weight[c];
                    clause_to_bump = Some(c);
                }
            }
            let Some(clause) = clause_to_bump else {
                return candidates;
            };

            for i in 0..self.clause_lits[clause].len() {
                let v = self.clause_lits[clause][i].var;
                if seen_vars[v] >= 100 {
                    continue;
                }
                candidates.push(v - 1);
                seen_vars[v] += 1;
                picked += 1;
            }
            seen_clauses[clause] = true;
        }
    }
}

impl Solver {
    /// Run the local-search engine over the problem clauses.
    ///
    /// Returns `Some(true)` when the walk found a model; the assignment is
    /// kept for model extraction. Otherwise the walk's best assignment
    /// becomes the target phase and heavy-clause variables are bumped.
    pub(crate) fn walk(&mut self) -> Option<bool> {
        self.stats.walks += 1;

        let mut engine = LocalSearch::default();
        engine.build(self);

        let target = self.target_phase.clone();
        let satisfied = engine.run(&mut self.rng, &target);

        self.stats.flips += engine.flips;

        if let Some(best) = engine.best_assignment() {
            for (atom, &value) in best.iter().enumerate() {
                self.target_phase[atom] = Some(value);
            }
        }

        if satisfied {
            log::info!(target: targets::WALK, "Walk satisfied the formula");
            self.walk_solution = engine.solution();
            self.solved_by_walk = true;
            return Some(true);
        }

        for atom in engine.bump_candidates() {
            self.var_bump_activity(atom);
        }
        None
    }
}
