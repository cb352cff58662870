use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Primary identifier
    pub eth_address: String,

    /// Display name
    pub character_name: String,

    /// Role names claimed for the user. These are claims, not yet resolved
    /// against full role records.
    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub is_admin: bool,

    /// Tribe membership, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tribe_id: Option<i64>,
}

impl UserRecord {
    pub fn new(eth_address: &str, character_name: &str) -> Self {
        Self {
            eth_address: eth_address.to_string(),
            character_name: character_name.to_string(),
            roles: Vec::new(),
            is_admin: false,
            tribe_id: None,
        }
    }

    /// Add a role claim
    pub fn with_role(mut self, role_name: &str) -> Self {
        self.roles.push(role_name.to_string());
        self
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    pub fn with_tribe(mut self, tribe_id: i64) -> Self {
        self.tribe_id = Some(tribe_id);
        self
    }
}

/// A role definition held by the identity service. A role whose `is_active`
/// is false must not count toward any permission grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl RoleRecord {
    /// Create an active role stamped with the current time
    pub fn new(id: i64, name: &str, created_by: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.to_string(),
            description: None,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            is_active: true,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_wire_shape() {
        let user = UserRecord::new("0xabc", "Pilot").with_role("Fleet Member").with_tribe(7);
        let value = serde_json::to_value(&user).unwrap();

        assert_eq!(value["ethAddress"], "0xabc");
        assert_eq!(value["characterName"], "Pilot");
        assert_eq!(value["roles"][0], "Fleet Member");
        assert_eq!(value["isAdmin"], false);
        assert_eq!(value["tribeId"], 7);
    }

    #[test]
    fn test_user_record_tolerates_missing_optionals() {
        let user: UserRecord = serde_json::from_str(
            r#"{"ethAddress":"0xabc","characterName":"Pilot"}"#,
        )
        .unwrap();

        assert!(user.roles.is_empty());
        assert!(!user.is_admin);
        assert_eq!(user.tribe_id, None);
    }

    #[test]
    fn test_role_record_wire_shape() {
        let json = r#"{
            "id": 3,
            "name": "Fleet Member",
            "description": null,
            "createdBy": "0xadmin",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z",
            "isActive": true
        }"#;

        let role: RoleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(role.id, 3);
        assert_eq!(role.name, "Fleet Member");
        assert!(role.is_active);
        assert_eq!(role.description, None);
    }
}
