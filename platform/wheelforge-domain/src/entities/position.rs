use serde::Serialize;

/// Cash and share holdings of a single-underlying wheel account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionState {
    cash: f64,
    shares_held: u64,
}

impl PositionState {
    pub fn new_with_cash(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            shares_held: 0,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn shares_held(&self) -> u64 {
        self.shares_held
    }

    /// Cash-secured-put mode when flat, covered-call mode otherwise.
    pub fn is_flat(&self) -> bool {
        self.shares_held == 0
    }

    pub fn credit_premium(&mut self, premium: f64) {
        self.cash += premium;
    }

    /// Put assignment: buy `shares` at `strike`.
    pub fn take_assignment(&mut self, strike: f64, shares: u64) {
        self.cash -= strike * shares as f64;
        self.shares_held += shares;
    }

    /// Call assignment: deliver every held share at `strike`.
    pub fn deliver_shares(&mut self, strike: f64) {
        self.cash += strike * self.shares_held as f64;
        self.shares_held = 0;
    }

    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.shares_held as f64 * price
    }
}

#[cfg(test)]
mod tests {
    use super::PositionState;

    #[test]
    fn assignment_round_trip_updates_cash_and_shares() {
        let mut position = PositionState::new_with_cash(10_000.0);
        position.credit_premium(50.0);
        position.take_assignment(95.0, 100);
        assert_eq!(position.shares_held(), 100);
        assert!((position.cash() - 550.0).abs() < 1e-9);
        assert!(!position.is_flat());

        position.deliver_shares(105.0);
        assert!(position.is_flat());
        assert!((position.cash() - 11_050.0).abs() < 1e-9);
        assert!((position.value(200.0) - 11_050.0).abs() < 1e-9);
    }
}
