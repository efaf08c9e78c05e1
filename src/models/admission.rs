// src/models/admission.rs
use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Form field names posted by the admission page.
pub mod form_fields {
    pub const STUDENT_FIRST_NAME: &str = "student_firstName";
    pub const STUDENT_MIDDLE_NAME: &str = "middleName";
    pub const STUDENT_LAST_NAME: &str = "lastName";
    pub const STUDENT_GENDER: &str = "gender";
    pub const STUDENT_DOB: &str = "dob";
    pub const STUDENT_ADDRESS: &str = "studentAddress";
    pub const PARENT_NAME: &str = "parentName";
    pub const PARENT_PHONE: &str = "parentPhone";
    pub const PARENT_ADDRESS: &str = "parentAddress";
    pub const CLASSROOM: &str = "classroom";
    pub const ACADEMIC_YEAR: &str = "academicYear";
    pub const PREVIOUS_SCHOOL: &str = "previousSchool";
    pub const NOTES: &str = "notes";
}

/// Raw submitted form data, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdmissionForm {
    fields: HashMap<String, String>,
}

impl AdmissionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Missing fields read as the empty string.
    pub fn get(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AdmissionForm
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentInfo {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub gender: String,
    pub dob: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParentInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcademicInfo {
    pub classroom: String,
    pub academic_year: String,
    pub previous_school: String,
    pub notes: String,
}

/// A submitted admission. Never mutated after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdmissionRecord {
    pub id: String,
    pub timestamp: String,
    pub student: StudentInfo,
    pub parent: ParentInfo,
    pub academic: AcademicInfo,
}

impl AdmissionRecord {
    pub fn from_form(form: &AdmissionForm, id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        use form_fields::*;

        Self {
            id: id.into(),
            timestamp: iso_timestamp(created_at),
            student: StudentInfo {
                first_name: form.get(STUDENT_FIRST_NAME),
                middle_name: form.get(STUDENT_MIDDLE_NAME),
                last_name: form.get(STUDENT_LAST_NAME),
                gender: form.get(STUDENT_GENDER),
                dob: form.get(STUDENT_DOB),
                address: form.get(STUDENT_ADDRESS),
            },
            parent: ParentInfo {
                name: form.get(PARENT_NAME),
                phone: form.get(PARENT_PHONE),
                address: form.get(PARENT_ADDRESS),
            },
            academic: AcademicInfo {
                classroom: form.get(CLASSROOM),
                academic_year: form.get(ACADEMIC_YEAR),
                previous_school: form.get(PREVIOUS_SCHOOL),
                notes: form.get(NOTES),
            },
        }
    }

    /// Flattens the record into a single spreadsheet row with dotted column names.
    pub fn to_row(&self) -> Map<String, Value> {
        let cells = [
            ("id", &self.id),
            ("timestamp", &self.timestamp),
            ("student.firstName", &self.student.first_name),
            ("student.middleName", &self.student.middle_name),
            ("student.lastName", &self.student.last_name),
            ("student.gender", &self.student.gender),
            ("student.dob", &self.student.dob),
            ("student.address", &self.student.address),
            ("parent.name", &self.parent.name),
            ("parent.phone", &self.parent.phone),
            ("parent.address", &self.parent.address),
            ("academic.classroom", &self.academic.classroom),
            ("academic.academicYear", &self.academic.academic_year),
            ("academic.previousSchool", &self.academic.previous_school),
            ("academic.notes", &self.academic.notes),
        ];

        cells
            .into_iter()
            .map(|(column, value)| (column.to_string(), Value::String(value.clone())))
            .collect()
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-15T08:30:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
