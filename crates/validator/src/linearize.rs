//! Lazy enumeration of the topological orders of a partial-order plan
//!
//! Orders are produced depth-first by backtracking over the steps whose
//! predecessors are all placed. Only the current prefix and one candidate
//! list per depth are kept, so asking for the first few orders of a wide plan
//! costs nothing like enumerating all of them.

use std::iter::FusedIterator;

/// Candidates for one position of the order and the next one to try
#[derive(Debug, Clone)]
struct Frame {
    candidates: Vec<usize>,
    next: usize,
}

/// Iterator over topological orders, as step indices
#[derive(Debug, Clone)]
pub struct Linearizations<'a> {
    successors: &'a [Vec<usize>],
    /// Unplaced predecessors per step
    in_degree: Vec<usize>,
    placed: Vec<bool>,
    prefix: Vec<usize>,
    frames: Vec<Frame>,
    started: bool,
    exhausted: bool,
}

impl<'a> Linearizations<'a> {
    /// `successors[i]` lists the steps that must come after step `i`; the
    /// graph must be acyclic.
    pub fn new(successors: &'a [Vec<usize>]) -> Self {
        let n = successors.len();
        let mut in_degree = vec![0usize; n];
        for next in successors.iter().flatten() {
            in_degree[*next] += 1;
        }
        Self {
            successors,
            in_degree,
            placed: vec![false; n],
            prefix: Vec::with_capacity(n),
            frames: Vec::with_capacity(n),
            started: false,
            exhausted: false,
        }
    }

    fn available(&self) -> Vec<usize> {
        (0..self.successors.len())
            .filter(|&i| !self.placed[i] && self.in_degree[i] == 0)
            .collect()
    }

    fn place(&mut self, step: usize) {
        self.placed[step] = true;
        self.prefix.push(step);
        for &next in &self.successors[step] {
            self.in_degree[next] -= 1;
        }
    }

    fn unplace(&mut self) {
        if let Some(step) = self.prefix.pop() {
            self.placed[step] = false;
            for &next in &self.successors[step] {
                self.in_degree[next] += 1;
            }
        }
    }
}

impl Iterator for Linearizations<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.exhausted {
            return None;
        }
        let n = self.successors.len();
        if !self.started {
            self.started = true;
            if n == 0 {
                self.exhausted = true;
                return Some(Vec::new());
            }
            let roots = self.available();
            self.frames.push(Frame {
                candidates: roots,
                next: 0,
            });
        }

        loop {
            let depth = self.frames.len();
            if depth == 0 {
                self.exhausted = true;
                return None;
            }
            // The step chosen at this depth is still placed; take it back
            if self.prefix.len() == depth {
                self.unplace();
            }

            let frame = &mut self.frames[depth - 1];
            let Some(&step) = frame.candidates.get(frame.next) else {
                self.frames.pop();
                continue;
            };
            frame.next += 1;

            self.place(step);
            if self.prefix.len() == n {
                return Some(self.prefix.clone());
            }
            let candidates = self.available();
            self.frames.push(Frame {
                candidates,
                next: 0,
            });
        }
    }
}

impl FusedIterator for Linearizations<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn respects(order: &[usize], successors: &[Vec<usize>]) -> bool {
        let position = |step: usize| order.iter().position(|&s| s == step);
        successors.iter().enumerate().all(|(before, nexts)| {
            nexts
                .iter()
                .all(|&after| position(before) < position(after))
        })
    }

    #[test]
    fn test_diamond_has_two_orders() {
        let successors = vec![vec![1, 2], vec![3], vec![3], vec![]];
        let orders: Vec<_> = Linearizations::new(&successors).collect();
        assert_eq!(orders, vec![vec![0, 1, 2, 3], vec![0, 2, 1, 3]]);
    }

    #[test]
    fn test_independent_steps_give_every_permutation() {
        let successors = vec![Vec::new(); 4];
        let orders: Vec<_> = Linearizations::new(&successors).collect();
        assert_eq!(orders.len(), 24);
        let distinct: BTreeSet<_> = orders.iter().cloned().collect();
        assert_eq!(distinct.len(), 24);
    }

    #[test]
    fn test_orders_respect_constraints() {
        let successors = vec![vec![2], vec![2, 3], vec![], vec![4], vec![]];
        let orders: Vec<_> = Linearizations::new(&successors).collect();
        assert!(!orders.is_empty());
        for order in &orders {
            assert_eq!(order.len(), 5);
            assert!(respects(order, &successors), "{:?}", order);
        }
        let distinct: BTreeSet<_> = orders.iter().cloned().collect();
        assert_eq!(distinct.len(), orders.len());
    }

    #[test]
    fn test_chain_and_empty_plan() {
        let chain = vec![vec![1], vec![2], vec![]];
        assert_eq!(Linearizations::new(&chain).collect::<Vec<_>>(), vec![vec![0, 1, 2]]);

        let empty: Vec<Vec<usize>> = Vec::new();
        let mut orders = Linearizations::new(&empty);
        assert_eq!(orders.next(), Some(Vec::new()));
        assert_eq!(orders.next(), None);
        assert_eq!(orders.next(), None);
    }

    #[test]
    fn test_enumeration_is_lazy() {
        // 12! orders exist; taking a few must not build them all
        let successors = vec![Vec::new(); 12];
        let first: Vec<_> = Linearizations::new(&successors).take(3).collect();
        assert_eq!(first[0], (0..12).collect::<Vec<_>>());
        assert_eq!(first.len(), 3);
    }
}
