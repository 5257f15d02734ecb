//! Balance state carried between simulation steps

/// State of an account at a point in time during a growth simulation
#[derive(Debug, Clone, Default)]
pub struct GrowthState {
    /// Current step (1-indexed once the first step has started)
    pub step: u32,

    /// Start of the current step, in years from the beginning
    pub t_start: f64,

    /// End of the current step, in years from the beginning
    pub t_end: f64,

    /// Balance at the beginning of the current step
    pub bop_balance: f64,

    /// Running balance
    pub balance: f64,

    /// Interest credited since the most recent withdrawal event
    pub interest_since_withdrawal: f64,

    pub total_interest: f64,
    pub total_deposits: f64,
    pub total_withdrawals: f64,
}

impl GrowthState {
    pub fn new(principal: f64) -> Self {
        Self {
            balance: principal,
            bop_balance: principal,
            ..Default::default()
        }
    }

    /// Advance to the next step covering `length` compounding periods
    pub fn advance(&mut self, steps_per_year: f64, length: f64) {
        self.step += 1;
        self.t_start = (self.step - 1) as f64 / steps_per_year;
        self.t_end = self.t_start + length / steps_per_year;
        self.bop_balance = self.balance;
    }

    /// Zero-based year index of the current step
    pub fn year_index(&self) -> u32 {
        (self.t_start + 1e-9).floor() as u32
    }

    pub fn deposit(&mut self, amount: f64) {
        self.balance += amount;
        self.total_deposits += amount;
    }

    pub fn credit_interest(&mut self, amount: f64) {
        self.balance += amount;
        self.total_interest += amount;
        self.interest_since_withdrawal += amount;
    }

    /// Withdraw up to `requested`, never taking the balance below zero.
    /// Returns the amount actually withdrawn.
    pub fn withdraw(&mut self, requested: f64) -> f64 {
        let amount = requested.min(self.balance).max(0.0);
        self.balance -= amount;
        self.total_withdrawals += amount;
        self.interest_since_withdrawal = 0.0;
        amount
    }
}

/// Number of events at frequency `per_year` whose time falls in a step.
///
/// End-of-period events occur at `j / f` for `j = 1, 2, ...` and are counted
/// when inside `(t_start, t_end]`; beginning-of-period events occur at
/// `(j - 1) / f` and are counted when inside `[t_start, t_end)`.
pub fn events_in_step(t_start: f64, t_end: f64, per_year: u32, at_beginning: bool) -> u32 {
    const EPS: f64 = 1e-9;
    let f = per_year as f64;
    let count = if at_beginning {
        (t_end * f - EPS).ceil() - (t_start * f - EPS).ceil()
    } else {
        (t_end * f + EPS).floor() - (t_start * f + EPS).floor()
    };
    count.max(0.0) as u32
}
