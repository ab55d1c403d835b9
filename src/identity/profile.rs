use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Role;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmergencyContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Self-lookup record returned by `/<role>/my-details`.
///
/// Staff records carry `employee_id`/`designation`/`salary`, student records carry
/// `enrollment_no`/`semester`/`branch_id`. Every field is optional on decode and
/// anything the backend adds is kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Image file name under the media root.
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,

    // staff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_super_admin: Option<bool>,

    // student
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_no: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<Value>,
    /// Either a populated `{name, ...}` object or a bare id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.middle_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn branch_name(&self) -> Option<String> {
        match self.branch_id.as_ref()? {
            Value::Object(m) => m.get("name").and_then(|v| v.as_str()).map(|s| s.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Absolute URL of the profile image, if the record names one.
    pub fn image_url(&self, media_base: &str) -> Option<String> {
        let file = self.profile.as_deref().filter(|s| !s.is_empty())?;
        Some(format!("{}/{}", media_base.trim_end_matches('/'), file))
    }

    /// Ordered label/value pairs for display, skipping absent fields.
    /// The identity line differs per role (employee id vs enrollment number).
    pub fn display_rows(&self, role: Role) -> Vec<(String, String)> {
        let mut rows: Vec<(String, String)> = Vec::new();
        let mut push = |label: &str, v: Option<String>| {
            if let Some(v) = v.filter(|s| !s.is_empty()) {
                rows.push((label.to_string(), v));
            }
        };
        push("Name", Some(self.full_name()));
        match role {
            Role::Admin | Role::Faculty => {
                push("Employee ID", self.employee_id.as_ref().map(value_text));
                let designation = self.designation.clone().map(|d| {
                    if self.is_super_admin == Some(true) { format!("{} (Super Admin)", d) } else { d }
                });
                push("Designation", designation);
            }
            Role::Student => {
                push("Enrollment No", self.enrollment_no.as_ref().map(value_text));
                push("Semester", self.semester.as_ref().map(value_text));
                push("Branch", self.branch_name());
            }
        }
        push("Email", self.email.clone());
        push("Phone", self.phone.clone());
        push("Gender", self.gender.clone());
        push("Date of Birth", self.dob.as_deref().map(format_date));
        push("Blood Group", self.blood_group.clone());
        let location = [self.address.as_deref(), self.city.as_deref(), self.state.as_deref(), self.pincode.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        push("Address", Some(location));
        if matches!(role, Role::Admin | Role::Faculty) {
            push("Joining Date", self.joining_date.as_deref().map(format_date));
            push("Salary", self.salary.map(format_amount));
            push("Status", self.status.clone());
        }
        if let Some(ec) = &self.emergency_contact {
            let parts = [ec.name.as_deref(), ec.relationship.as_deref(), ec.phone.as_deref()]
                .into_iter()
                .flatten()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" / ");
            push("Emergency Contact", Some(parts));
        }
        rows
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render an ISO date or timestamp as "January 5, 2024". Unparseable input is returned as-is.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%B %-d, %Y").to_string();
    }
    let day_part = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(day_part, "%Y-%m-%d") {
        Ok(d) => d.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Thousands-separated whole amount ("55,000").
fn format_amount(v: f64) -> String {
    let whole = v.round() as i64;
    let digits = whole.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 { out.push(','); }
        out.push(ch);
    }
    if whole < 0 { format!("-{}", out) } else { out }
}
