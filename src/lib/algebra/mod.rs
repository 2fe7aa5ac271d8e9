use std::fmt::Debug;

use crate::{
    budget::Budget,
    error::{SfaError, SfaResult},
};

pub mod interval;

/// One atom of the Boolean space spanned by a list of predicates.
///
/// `bits[i]` is true iff `guard` implies the `i`-th input predicate, and false
/// iff `guard` implies its negation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minterm<P> {
    pub guard: P,
    pub bits: Vec<bool>,
}

impl<P> Minterm<P> {
    pub fn implies(&self, index: usize) -> bool {
        self.bits[index]
    }

    /// Indices of the input predicates this minterm implies.
    pub fn implied(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, bit)| **bit)
            .map(|(i, _)| i)
    }
}

/// An effective Boolean algebra over a domain of symbols.
///
/// Every automaton algorithm in this crate is written against this trait.
/// Operations that may call into a solver return [`SfaResult`] so that they
/// can report budget exhaustion.
pub trait BooleanAlgebra {
    type Pred: Clone + Debug;
    type Symbol: Clone + Debug + PartialEq;

    /// The predicate denoting every symbol.
    fn top(&self) -> Self::Pred;

    /// The predicate denoting no symbol.
    fn bottom(&self) -> Self::Pred;

    /// The predicate denoting exactly `symbol`.
    fn atom(&self, symbol: &Self::Symbol) -> Self::Pred;

    fn and(&self, a: &Self::Pred, b: &Self::Pred) -> SfaResult<Self::Pred>;

    fn or(&self, a: &Self::Pred, b: &Self::Pred) -> SfaResult<Self::Pred>;

    fn not(&self, a: &Self::Pred) -> SfaResult<Self::Pred>;

    fn is_satisfiable(&self, p: &Self::Pred) -> SfaResult<bool>;

    fn has_model(&self, p: &Self::Pred, symbol: &Self::Symbol) -> SfaResult<bool>;

    /// Some symbol satisfying `p`, or `None` if `p` is unsatisfiable. No
    /// particular witness is guaranteed.
    fn generate_witness(&self, p: &Self::Pred) -> SfaResult<Option<Self::Symbol>>;

    fn are_equivalent(&self, a: &Self::Pred, b: &Self::Pred) -> SfaResult<bool> {
        let a_not_b = self.and(a, &self.not(b)?)?;
        if self.is_satisfiable(&a_not_b)? {
            return Ok(false);
        }

        let b_not_a = self.and(&self.not(a)?, b)?;
        Ok(!self.is_satisfiable(&b_not_a)?)
    }

    fn and_all<'a>(&self, preds: impl IntoIterator<Item = &'a Self::Pred>) -> SfaResult<Self::Pred>
    where
        Self::Pred: 'a,
    {
        let mut result = self.top();
        for p in preds {
            result = self.and(&result, p)?;
        }
        Ok(result)
    }

    fn or_all<'a>(&self, preds: impl IntoIterator<Item = &'a Self::Pred>) -> SfaResult<Self::Pred>
    where
        Self::Pred: 'a,
    {
        let mut result = self.bottom();
        for p in preds {
            result = self.or(&result, p)?;
        }
        Ok(result)
    }

    /// Computes the satisfiable minterms of `preds`.
    ///
    /// The result is a partition of the domain: the guards are pairwise
    /// disjoint and their disjunction is `top`. Fails if `preds` is longer than
    /// the budget allows or if the time limit is reached.
    fn minterms(&self, preds: &[Self::Pred], budget: &Budget) -> SfaResult<Vec<Minterm<Self::Pred>>> {
        if preds.len() > budget.get_max_minterm_predicates() {
            return Err(SfaError::MintermLimit(budget.get_max_minterm_predicates()));
        }

        let mut minterms = vec![];
        let mut stack = vec![(self.top(), Vec::with_capacity(preds.len()))];

        while let Some((current, bits)) = stack.pop() {
            budget.check()?;

            let depth = bits.len();
            if depth == preds.len() {
                minterms.push(Minterm {
                    guard: current,
                    bits,
                });
                continue;
            }

            let without = self.and(&current, &self.not(&preds[depth])?)?;
            if self.is_satisfiable(&without)? {
                let mut without_bits = bits.clone();
                without_bits.push(false);
                stack.push((without, without_bits));
            }

            let with = self.and(&current, &preds[depth])?;
            if self.is_satisfiable(&with)? {
                let mut with_bits = bits;
                with_bits.push(true);
                stack.push((with, with_bits));
            }
        }

        Ok(minterms)
    }
}

#[cfg(test)]
mod tests {
    use super::{interval::*, *};

    #[test]
    fn test_minterms_partition_the_domain() {
        let ba = CharIntervalAlgebra;
        let preds = vec![CharPred::range('a', 'm'), CharPred::range('h', 'z')];

        let minterms = ba.minterms(&preds, &Budget::unlimited()).unwrap();

        // [a-g], [h-m], [n-z] and everything else
        assert_eq!(minterms.len(), 4);

        for (i, a) in minterms.iter().enumerate() {
            for b in minterms.iter().skip(i + 1) {
                let both = ba.and(&a.guard, &b.guard).unwrap();
                assert!(!ba.is_satisfiable(&both).unwrap());
            }
        }

        let all = ba.or_all(minterms.iter().map(|m| &m.guard)).unwrap();
        assert!(ba.are_equivalent(&all, &ba.top()).unwrap());

        let middle = minterms
            .iter()
            .find(|m| m.implies(0) && m.implies(1))
            .unwrap();
        assert_eq!(middle.guard, CharPred::range('h', 'm'));
        assert_eq!(middle.implied().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_minterms_of_nothing() {
        let ba = CharIntervalAlgebra;
        let minterms = ba.minterms(&[], &Budget::unlimited()).unwrap();

        assert_eq!(minterms.len(), 1);
        assert_eq!(minterms[0].guard, ba.top());
        assert!(minterms[0].bits.is_empty());
    }

    #[test]
    fn test_minterms_respect_the_predicate_cap() {
        let ba = CharIntervalAlgebra;
        let preds = vec![CharPred::char('a'); 3];
        let budget = Budget::unlimited().with_max_minterm_predicates(2);

        assert_eq!(
            ba.minterms(&preds, &budget),
            Err(SfaError::MintermLimit(2))
        );
    }

    #[test]
    fn test_minterms_respect_the_time_limit() {
        let ba = CharIntervalAlgebra;
        let budget = Budget::with_time_limit(std::time::Duration::ZERO);

        let result = ba.minterms(&[CharPred::char('a')], &budget);
        assert!(matches!(result, Err(SfaError::Timeout(_))));
    }
}
