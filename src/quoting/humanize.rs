//! Randomized transfer amounts.
//!
//! Amounts are drawn on the decimal grid of the configured bounds, so bounds
//! written to 5 places yield an amount with at most 5 places instead of
//! something like `0.0014325234`.

use rand::Rng;

use crate::quoting::types::{DecimalAmount, QuoteError, QuoteResult};

/// How a bridge amount is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountStrategy {
    /// Uniform over `[min, max]`.
    Range { min: DecimalAmount, max: DecimalAmount },
    /// `center ± uniform[0, accuracy]`.
    Around { center: DecimalAmount, accuracy: DecimalAmount },
}

impl AmountStrategy {
    /// Draw one amount.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> QuoteResult<DecimalAmount> {
        match *self {
            AmountStrategy::Range { min, max } => humanize(rng, min, max),
            AmountStrategy::Around { center, accuracy } => humanize_around(rng, center, accuracy),
        }
    }
}

/// Draw uniformly from `[min_bound, max_bound]` at the finer of the two precisions.
pub fn humanize<R: Rng + ?Sized>(
    rng: &mut R,
    min_bound: DecimalAmount,
    max_bound: DecimalAmount,
) -> QuoteResult<DecimalAmount> {
    let decimals = min_bound.decimals().max(max_bound.decimals());
    let low = widen(min_bound, decimals)?;
    let high = widen(max_bound, decimals)?;
    if low > high {
        return Err(QuoteError::InvalidArgument(format!(
            "min amount {} exceeds max amount {}",
            min_bound, max_bound
        )));
    }
    Ok(DecimalAmount::new(rng.gen_range(low..=high), decimals))
}

/// Draw an offset from `[0, accuracy]` on the accuracy's grid, pick a sign at
/// random and apply it to `center`.
pub fn humanize_around<R: Rng + ?Sized>(
    rng: &mut R,
    center: DecimalAmount,
    accuracy: DecimalAmount,
) -> QuoteResult<DecimalAmount> {
    let offset = DecimalAmount::new(rng.gen_range(0..=accuracy.scaled()), accuracy.decimals());
    let add = rng.gen_bool(0.5);

    let decimals = center.decimals().max(accuracy.decimals());
    let base = widen(center, decimals)?;
    let delta = widen(offset, decimals)?;

    let scaled = if add {
        base.checked_add(delta)
            .ok_or_else(|| QuoteError::InvalidArgument(format!("{} + {} overflows", center, offset)))?
    } else {
        base.checked_sub(delta).ok_or(QuoteError::NegativeAmount {
            center: center.to_string(),
            offset: offset.to_string(),
        })?
    };
    Ok(DecimalAmount::new(scaled, decimals))
}

fn widen(amount: DecimalAmount, decimals: u8) -> QuoteResult<u128> {
    amount
        .rescale(decimals)
        .ok_or_else(|| QuoteError::InvalidArgument(format!("{} is too large", amount)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn amount(s: &str) -> DecimalAmount {
        s.parse().unwrap()
    }

    #[test]
    fn test_around_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let center = amount("0.001");
        let accuracy = amount("0.00005");
        for _ in 0..500 {
            let value = humanize_around(&mut rng, center, accuracy).unwrap();
            assert_eq!(value.decimals(), 5);
            assert!(value.scaled() >= 95 && value.scaled() <= 105, "{}", value);
        }
    }

    #[test]
    fn test_around_is_deterministic_for_seed() {
        let center = amount("0.001");
        let accuracy = amount("0.00005");
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| humanize_around(&mut rng, center, accuracy).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_around_zero_accuracy_returns_center() {
        let mut rng = StdRng::seed_from_u64(1);
        let value = humanize_around(&mut rng, amount("0.002"), amount("0")).unwrap();
        assert_eq!(value.to_wei().unwrap(), amount("0.002").to_wei().unwrap());
    }

    #[test]
    fn test_around_below_zero_is_reported() {
        let mut rng = StdRng::seed_from_u64(3);
        let center = amount("0");
        let accuracy = amount("5");
        let outcomes: Vec<_> = (0..50)
            .map(|_| humanize_around(&mut rng, center, accuracy))
            .collect();
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(QuoteError::NegativeAmount { .. }))));
    }

    #[test]
    fn test_range_uses_finer_precision() {
        let mut rng = StdRng::seed_from_u64(11);
        let min = amount("0.001");
        let max = amount("0.0025");
        for _ in 0..500 {
            let value = humanize(&mut rng, min, max).unwrap();
            assert_eq!(value.decimals(), 4);
            assert!((10..=25).contains(&value.scaled()));
        }
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(humanize(&mut rng, amount("0.5"), amount("0.1")).is_err());
    }

    #[test]
    fn test_strategy_dispatch() {
        let mut rng = StdRng::seed_from_u64(5);
        let strategy = AmountStrategy::Range { min: amount("1"), max: amount("1") };
        assert_eq!(strategy.draw(&mut rng).unwrap(), amount("1"));
    }
}
