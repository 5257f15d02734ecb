//! Root finding: generic Newton-Raphson and bisection, IRR family, and the
//! rate needed to reach a savings target

mod newton;
mod irr;
mod target;

pub use newton::{SolverConfig, SolverOutcome, bisection, newton_raphson, newton_raphson_bounded};
pub use irr::{
    DatedCashFlow, IrrParams, IrrResult, SolveMethod, irr, irr_with_config, mirr, npv, xirr,
    DEFAULT_GUESS, RATE_CEILING, RATE_FLOOR,
};
pub use target::{
    TargetRateParams, TargetRateResult, periods_to_target, required_rate,
    required_rate_for_target,
};
