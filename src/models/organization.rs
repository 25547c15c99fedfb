//! Organizational reference data: offices, departments and positions.

use serde::{Deserialize, Serialize};

/// A department grouping positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
}

/// Request body for creating or renaming a department.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRequest {
    pub name: String,
}

/// A job title, optionally attached to a department.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    pub display_name: String,
}

impl Position {
    pub fn new(
        id: String,
        title: String,
        department_id: Option<String>,
        department_name: Option<String>,
    ) -> Self {
        let display_name = position_display_name(&title, department_name.as_deref());
        Self {
            id,
            title,
            department_id,
            department_name,
            display_name,
        }
    }
}

/// `title (department)`, or just the title for a position without a department.
pub fn position_display_name(title: &str, department_name: Option<&str>) -> String {
    match department_name {
        Some(department) if !department.is_empty() => format!("{} ({})", title, department),
        _ => title.to_string(),
    }
}

/// Request body for creating a position.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePositionRequest {
    pub title: String,
    #[serde(default)]
    pub department_id: Option<String>,
}

/// Request body for updating a position.
///
/// `departmentId: null` and an absent `departmentId` both keep the current
/// department; send `clearDepartment: true` to detach it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePositionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub clear_department: bool,
}

/// A branch office.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    pub id: String,
    pub name: String,
    pub city: String,
    pub address: String,
    pub display_name: String,
}

impl Office {
    pub fn new(id: String, name: String, city: String, address: String) -> Self {
        let display_name = format!("{} ({})", name, city);
        Self {
            id,
            name,
            city,
            address,
            display_name,
        }
    }
}

/// Request body for creating an office.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfficeRequest {
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub address: String,
}

/// Request body for updating an office.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfficeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Query parameters for listing offices, departments and positions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationFilter {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display_with_department() {
        let position = Position::new(
            "p1".to_string(),
            "Chief auditor".to_string(),
            Some("d1".to_string()),
            Some("Audit".to_string()),
        );
        assert_eq!(position.display_name, "Chief auditor (Audit)");
    }

    #[test]
    fn test_position_display_without_department() {
        let position = Position::new("p1".to_string(), "Driver".to_string(), None, None);
        assert_eq!(position.display_name, "Driver");
    }

    #[test]
    fn test_office_display() {
        let office = Office::new(
            "o1".to_string(),
            "Central".to_string(),
            "Bishkek".to_string(),
            String::new(),
        );
        assert_eq!(office.display_name, "Central (Bishkek)");
    }
}
