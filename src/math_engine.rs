use crate::error::{PokerError, PokerResult};

/// Share of the final pot a caller must put in: `bet / (pot + 2·bet)`.
pub fn pot_odds(pot: f64, bet: f64) -> PokerResult<f64> {
    if pot <= 0.0 || bet <= 0.0 {
        return Err(PokerError::InvalidValue(
            "Pot and bet must be positive".to_string(),
        ));
    }
    Ok(bet / (pot + bet + bet))
}

/// Minimum defense frequency: how often the defender must continue so a
/// pure bluff of `bet_size` into `pot_size` breaks even.
pub fn mdf(bet_size: f64, pot_size: f64) -> PokerResult<f64> {
    if pot_size <= 0.0 {
        return Err(PokerError::InvalidValue("Pot must be positive".to_string()));
    }
    Ok(pot_size / (pot_size + bet_size))
}

/// Hero's bet as a percentage of the pot, capped at the effective stack.
pub fn bet_amount(pot: f64, bet_pct: f64, stack: f64) -> f64 {
    (pot * bet_pct / 100.0).min(stack).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pot_sized_bet() {
        assert_relative_eq!(pot_odds(100.0, 100.0).unwrap(), 1.0 / 3.0);
        assert_relative_eq!(mdf(100.0, 100.0).unwrap(), 0.5);
    }

    #[test]
    fn rejects_empty_pot() {
        assert!(pot_odds(0.0, 10.0).is_err());
        assert!(mdf(10.0, 0.0).is_err());
    }

    #[test]
    fn bet_is_capped_by_stack() {
        assert_relative_eq!(bet_amount(100.0, 75.0, 1_000.0), 75.0);
        assert_relative_eq!(bet_amount(100.0, 75.0, 30.0), 30.0);
        assert_relative_eq!(bet_amount(100.0, 75.0, 0.0), 0.0);
    }
}
