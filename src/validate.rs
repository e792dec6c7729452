//! Form validation for people, relationships and events.
//!
//! Validation runs before any request is sent; a non-empty error list means
//! nothing goes over the network.

use std::fmt;

use serde::Serialize;

use crate::model::{Event, Gender, Person, Relationship};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Checks the member form. Gender must be chosen explicitly; `Unknown` counts
/// as not chosen.
pub fn validate_person(person: &Person) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if person.full_name.trim().is_empty() {
        errors.push(FieldError {
            field: "full_name",
            message: "Nama lengkap harus diisi",
        });
    }
    if person.gender == Gender::Unknown {
        errors.push(FieldError {
            field: "gender",
            message: "Jenis kelamin harus dipilih",
        });
    }
    if is_blank(person.birth_date.as_deref()) {
        errors.push(FieldError {
            field: "birth_date",
            message: "Tanggal lahir harus diisi",
        });
    }
    errors
}

pub fn validate_event(event: &Event) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if event.title.trim().is_empty() {
        errors.push(FieldError {
            field: "title",
            message: "Judul acara harus diisi",
        });
    }
    if is_blank(event.date.as_deref()) {
        errors.push(FieldError {
            field: "event_date",
            message: "Tanggal acara harus diisi",
        });
    }
    errors
}

pub fn validate_relationship(relationship: &Relationship) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let first = relationship.person_id_1.trim();
    let second = relationship.person_id_2.trim();
    if first.is_empty() {
        errors.push(FieldError {
            field: "person_id_1",
            message: "Anggota keluarga harus dipilih",
        });
    }
    if second.is_empty() {
        errors.push(FieldError {
            field: "person_id_2",
            message: "Anggota keluarga harus dipilih",
        });
    } else if first == second {
        errors.push(FieldError {
            field: "person_id_2",
            message: "Hubungan tidak bisa dengan diri sendiri",
        });
    }
    if relationship.kind.as_str().trim().is_empty() {
        errors.push(FieldError {
            field: "type",
            message: "Jenis hubungan harus dipilih",
        });
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_needs_two_distinct_people() {
        let rel = Relationship::new("", "a", "a", "spouse");
        assert_eq!(
            validate_relationship(&rel),
            vec![FieldError {
                field: "person_id_2",
                message: "Hubungan tidak bisa dengan diri sendiri",
            }]
        );
        let rel = Relationship::new("", "", "b", "");
        let fields: Vec<_> = validate_relationship(&rel).iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["person_id_1", "type"]);
        assert!(validate_relationship(&Relationship::new("", "a", "b", "sibling")).is_empty());
    }

    #[test]
    fn empty_member_form_reports_every_field() {
        let errors = validate_person(&Person::default());
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["full_name", "gender", "birth_date"]);
        assert_eq!(errors[0].message, "Nama lengkap harus diisi");
    }

    #[test]
    fn complete_member_form_passes() {
        let mut person = Person::new("", "Siti Aminah", Gender::Female);
        person.birth_date = Some("1950-02-01".to_string());
        assert!(validate_person(&person).is_empty());
    }

    #[test]
    fn whitespace_title_is_blank() {
        let event = Event {
            title: "   ".to_string(),
            date: Some("2020-01-01".to_string()),
            ..Event::default()
        };
        let errors = validate_event(&event);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "title: Judul acara harus diisi");
    }
}
