use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Permission levels, lowest first. A higher level implies every lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Leitor,
    Colaborador,
    GestorConteudo,
    AdministradorEquipamentos,
    AdministradorCampanhas,
    Superusuario,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Leitor,
        Role::Colaborador,
        Role::GestorConteudo,
        Role::AdministradorEquipamentos,
        Role::AdministradorCampanhas,
        Role::Superusuario,
    ];

    pub fn rank(&self) -> u8 {
        match self {
            Role::Leitor => 1,
            Role::Colaborador => 2,
            Role::GestorConteudo => 3,
            Role::AdministradorEquipamentos => 4,
            Role::AdministradorCampanhas => 5,
            Role::Superusuario => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Leitor => "leitor",
            Role::Colaborador => "colaborador",
            Role::GestorConteudo => "gestor_conteudo",
            Role::AdministradorEquipamentos => "administrador_equipamentos",
            Role::AdministradorCampanhas => "administrador_campanhas",
            Role::Superusuario => "superusuario",
        }
    }

    /// True when this role meets or exceeds `required`.
    pub fn satisfies(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_one_through_six() {
        let ranks: Vec<u8> = Role::ALL.iter().map(Role::rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn lower_rank_never_satisfies_higher() {
        for r1 in Role::ALL {
            for r2 in Role::ALL {
                assert_eq!(r1.satisfies(r2), r1.rank() >= r2.rank(), "{} vs {}", r1, r2);
                if r1.rank() < r2.rank() {
                    assert!(!r1.satisfies(r2));
                }
            }
        }
    }

    #[test]
    fn parses_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
        assert!("Leitor".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&Role::GestorConteudo).unwrap();
        assert_eq!(json, "\"gestor_conteudo\"");
    }
}
