//! Employee profile model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::pin;

/// Placeholder stored for contact fields that were not provided.
pub const CONTACT_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Employment status. Departure is modeled as `Terminated`, never as a delete.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    #[default]
    Active,
    OnLeave,
    Terminated,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Active => "active",
            ProfileStatus::OnLeave => "on_leave",
            ProfileStatus::Terminated => "terminated",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProfileStatus::Active),
            "on_leave" => Some(ProfileStatus::OnLeave),
            "terminated" => Some(ProfileStatus::Terminated),
            _ => None,
        }
    }
}

/// An employee record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,
    pub pin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number_work: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number_mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number_government: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub status: ProfileStatus,
    pub is_inspector: bool,
    pub created_at: String,
    pub updated_at: String,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

impl Profile {
    /// `first last patronymic`, skipping an absent patronymic.
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name, self.patronymic.as_deref())
    }
}

pub fn full_name(first_name: &str, last_name: &str, patronymic: Option<&str>) -> String {
    match patronymic.map(str::trim).filter(|p| !p.is_empty()) {
        Some(patronymic) => format!("{} {} {}", first_name, last_name, patronymic),
        None => format!("{} {}", first_name, last_name),
    }
}

/// Request body for creating a profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub patronymic: Option<String>,
    pub pin: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub position_id: Option<String>,
    #[serde(default)]
    pub office_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number_work: Option<String>,
    #[serde(default)]
    pub phone_number_mobile: Option<String>,
    #[serde(default)]
    pub phone_number_government: Option<String>,
    #[serde(default)]
    pub office_number: Option<String>,
    #[serde(default)]
    pub photo_path: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub status: ProfileStatus,
    #[serde(default)]
    pub is_inspector: bool,
}

/// A validated profile ready to be inserted, with derived fields filled in.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub pin: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub position_id: Option<String>,
    pub office_id: Option<String>,
    pub email: Option<String>,
    pub phone_number_work: String,
    pub phone_number_mobile: String,
    pub phone_number_government: String,
    pub office_number: String,
    pub photo_path: Option<String>,
    pub bio: String,
    pub status: ProfileStatus,
    pub is_inspector: bool,
}

impl NewProfile {
    /// Validate the request and derive whatever the PIN has to supply.
    ///
    /// Birth date and gender given explicitly are kept as-is; only missing
    /// ones are decoded from the PIN.
    pub fn from_request(request: &CreateProfileRequest) -> Result<Self, AppError> {
        let first_name = required(&request.first_name, "First name")?;
        let last_name = required(&request.last_name, "Last name")?;
        let pin_value = request.pin.trim().to_string();
        pin::validate_length(&pin_value)?;

        let birth_date = match request.birth_date {
            Some(date) => date,
            None => pin::birth_date(&pin_value)?,
        };
        let gender = match request.gender {
            Some(gender) => gender,
            None => pin::gender(&pin_value)?,
        };

        Ok(Self {
            first_name,
            last_name,
            patronymic: non_empty(request.patronymic.as_deref()),
            pin: pin_value,
            birth_date,
            gender,
            position_id: non_empty(request.position_id.as_deref()),
            office_id: non_empty(request.office_id.as_deref()),
            email: non_empty(request.email.as_deref()),
            phone_number_work: or_placeholder(request.phone_number_work.as_deref()),
            phone_number_mobile: or_placeholder(request.phone_number_mobile.as_deref()),
            phone_number_government: or_placeholder(request.phone_number_government.as_deref()),
            office_number: or_placeholder(request.office_number.as_deref()),
            photo_path: non_empty(request.photo_path.as_deref()),
            bio: or_placeholder(request.bio.as_deref()),
            status: request.status,
            is_inspector: request.is_inspector,
        })
    }
}

/// Request body for updating a profile.
///
/// A changed PIN is length-checked but never re-derives birth date or gender.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub patronymic: Option<String>,
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub position_id: Option<String>,
    #[serde(default)]
    pub clear_position: bool,
    #[serde(default)]
    pub office_id: Option<String>,
    #[serde(default)]
    pub clear_office: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number_work: Option<String>,
    #[serde(default)]
    pub phone_number_mobile: Option<String>,
    #[serde(default)]
    pub phone_number_government: Option<String>,
    #[serde(default)]
    pub office_number: Option<String>,
    #[serde(default)]
    pub photo_path: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub status: Option<ProfileStatus>,
    #[serde(default)]
    pub is_inspector: Option<bool>,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Query parameters for listing profiles.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFilter {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub position_id: Option<String>,
    #[serde(default)]
    pub office_id: Option<String>,
    #[serde(default)]
    pub status: Option<ProfileStatus>,
}

pub(crate) fn required(value: &str, label: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", label)));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn or_placeholder(value: Option<&str>) -> String {
    non_empty(value).unwrap_or_else(|| CONTACT_PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinError;

    fn request(pin: &str) -> CreateProfileRequest {
        CreateProfileRequest {
            first_name: "Aida".to_string(),
            last_name: "Toktosunova".to_string(),
            patronymic: None,
            pin: pin.to_string(),
            birth_date: None,
            gender: None,
            position_id: None,
            office_id: None,
            email: None,
            phone_number_work: None,
            phone_number_mobile: Some("0555 123 456".to_string()),
            phone_number_government: None,
            office_number: None,
            photo_path: None,
            bio: None,
            status: ProfileStatus::Active,
            is_inspector: false,
        }
    }

    #[test]
    fn test_derives_birth_date_and_gender() {
        let profile = NewProfile::from_request(&request("10101199912345")).unwrap();
        assert_eq!(profile.birth_date, NaiveDate::from_ymd_opt(1999, 1, 1).unwrap());
        assert_eq!(profile.gender, Gender::Female);
    }

    #[test]
    fn test_explicit_fields_are_not_recomputed() {
        let mut req = request("10101199912345");
        req.birth_date = NaiveDate::from_ymd_opt(1980, 5, 17);
        req.gender = Some(Gender::Male);

        let profile = NewProfile::from_request(&req).unwrap();
        assert_eq!(profile.birth_date, NaiveDate::from_ymd_opt(1980, 5, 17).unwrap());
        assert_eq!(profile.gender, Gender::Male);
    }

    #[test]
    fn test_explicit_fields_skip_pin_decoding_but_not_length() {
        let mut req = request("39999999912345");
        req.birth_date = NaiveDate::from_ymd_opt(1980, 5, 17);
        req.gender = Some(Gender::Male);
        assert!(NewProfile::from_request(&req).is_ok());

        req.pin = "123".to_string();
        let err = NewProfile::from_request(&req).unwrap_err();
        assert!(matches!(err, AppError::InvalidPin(PinError::Length(3))));
    }

    #[test]
    fn test_bad_gender_digit_rejected() {
        let err = NewProfile::from_request(&request("30101199912345")).unwrap_err();
        assert!(matches!(err, AppError::InvalidPin(PinError::GenderDigit('3'))));
    }

    #[test]
    fn test_contact_placeholders() {
        let profile = NewProfile::from_request(&request("10101199912345")).unwrap();
        assert_eq!(profile.phone_number_work, CONTACT_PLACEHOLDER);
        assert_eq!(profile.phone_number_government, CONTACT_PLACEHOLDER);
        assert_eq!(profile.office_number, CONTACT_PLACEHOLDER);
        assert_eq!(profile.bio, CONTACT_PLACEHOLDER);
        assert_eq!(profile.phone_number_mobile, "0555 123 456");
        assert!(profile.email.is_none());
    }

    #[test]
    fn test_required_names() {
        let mut req = request("10101199912345");
        req.last_name = "  ".to_string();
        let err = NewProfile::from_request(&req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_full_name_skips_missing_patronymic() {
        assert_eq!(full_name("Aida", "Toktosunova", None), "Aida Toktosunova");
        assert_eq!(full_name("Aida", "Toktosunova", Some("")), "Aida Toktosunova");
        assert_eq!(
            full_name("Aida", "Toktosunova", Some("Bakytovna")),
            "Aida Toktosunova Bakytovna"
        );
    }

    #[test]
    fn test_status_round_trip_names() {
        for status in [ProfileStatus::Active, ProfileStatus::OnLeave, ProfileStatus::Terminated] {
            assert_eq!(ProfileStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(ProfileStatus::default(), ProfileStatus::Active);
    }
}
