use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlanCode {
    Month,
    Quarter,
    Year,
}

impl PlanCode {
    pub const ALL: [PlanCode; 3] = [PlanCode::Month, PlanCode::Quarter, PlanCode::Year];
}

impl Display for PlanCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            PlanCode::Month => "month",
            PlanCode::Quarter => "quarter",
            PlanCode::Year => "year",
        };
        write!(f, "{}", code)
    }
}

impl FromStr for PlanCode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "month" => Ok(PlanCode::Month),
            "quarter" => Ok(PlanCode::Quarter),
            "year" => Ok(PlanCode::Year),
            other => Err(format!("Invalid plan code: {}", other)),
        }
    }
}
