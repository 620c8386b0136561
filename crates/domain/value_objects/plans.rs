use serde::Serialize;

use crate::domain::value_objects::enums::plan_codes::PlanCode;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Plan {
    pub code: PlanCode,
    pub title: &'static str,
    pub days: i64,
    pub price_usd: f64,
}

const PLANS: [Plan; 3] = [
    Plan {
        code: PlanCode::Month,
        title: "1 month",
        days: 30,
        price_usd: 15.0,
    },
    Plan {
        code: PlanCode::Quarter,
        title: "3 months",
        days: 90,
        price_usd: 35.0,
    },
    Plan {
        code: PlanCode::Year,
        title: "12 months",
        days: 365,
        price_usd: 120.0,
    },
];

impl Plan {
    pub fn all() -> &'static [Plan] {
        &PLANS
    }
}

impl PlanCode {
    pub fn plan(&self) -> Plan {
        match self {
            PlanCode::Month => PLANS[0],
            PlanCode::Quarter => PLANS[1],
            PlanCode::Year => PLANS[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_resolves_to_its_own_plan() {
        for code in PlanCode::ALL {
            assert_eq!(code.plan().code, code);
        }
    }

    #[test]
    fn month_plan_costs_fifteen_for_thirty_days() {
        let plan = PlanCode::Month.plan();
        assert_eq!(plan.days, 30);
        assert_eq!(plan.price_usd, 15.0);
    }
}
