use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ROLE_ID: &str = "software_engineer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub difficulty: Difficulty,
    pub description: &'static str,
}

static ROLES: [RoleInfo; 4] = [
    RoleInfo {
        id: "software_engineer",
        name: "Software Engineer",
        difficulty: Difficulty::Medium,
        description: "A software engineer who designs, builds and maintains production systems, \
            debugs complex issues, reviews code and collaborates closely with product and design.",
    },
    RoleInfo {
        id: "product_manager",
        name: "Product Manager",
        difficulty: Difficulty::Hard,
        description: "A product manager who sets direction, prioritizes features under constraints, \
            aligns engineering, design and business stakeholders, and owns user outcomes.",
    },
    RoleInfo {
        id: "data_scientist",
        name: "Data Scientist",
        difficulty: Difficulty::Medium,
        description: "A data scientist who works with large datasets, builds and evaluates models, \
            and communicates technical findings to non-technical stakeholders.",
    },
    RoleInfo {
        id: "customer_success",
        name: "Customer Success Manager",
        difficulty: Difficulty::Easy,
        description: "A customer success manager who onboards clients, resolves escalations \
            and keeps long-term customer relationships healthy.",
    },
];

pub fn all() -> &'static [RoleInfo] {
    &ROLES
}

/// Resolves a role id. Unknown or missing ids fall back to the software
/// engineer role instead of failing.
pub fn lookup(role_id: &str) -> &'static RoleInfo {
    ROLES
        .iter()
        .find(|r| r.id == role_id.trim())
        .unwrap_or_else(default_role)
}

pub fn default_role() -> &'static RoleInfo {
    &ROLES[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_resolve_to_themselves() {
        assert_eq!(lookup("product_manager").difficulty, Difficulty::Hard);
        assert_eq!(lookup("data_scientist").name, "Data Scientist");
    }

    #[test]
    fn unknown_role_falls_back_to_software_engineer() {
        let role = lookup("astronaut");
        assert_eq!(role.id, DEFAULT_ROLE_ID);
        assert_eq!(lookup("").id, DEFAULT_ROLE_ID);
    }

    #[test]
    fn default_role_is_first_in_catalog() {
        assert_eq!(default_role().id, DEFAULT_ROLE_ID);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("brutal".parse::<Difficulty>().is_err());
    }
}
