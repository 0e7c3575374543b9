//! Role entity - a named permission set within a guild

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Guild role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: i32,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub permissions: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_deserializes() {
        let role: Role = serde_json::from_str(
            r#"{"id": "7", "name": "admin", "color": 255, "position": 1, "permissions": 8}"#,
        )
        .unwrap();
        assert_eq!(role.id, Snowflake::new(7));
        assert_eq!(role.name, "admin");
        assert_eq!(role.permissions, 8);
    }
}
