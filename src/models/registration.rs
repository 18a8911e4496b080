// src/models/registration.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::models::exam::Exam;

static AADHAAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{12}$").expect("aadhaar pattern is valid"));

/// Represents the 'exam_registrations' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExamRegistration {
    pub id: i64,
    pub student_id: i64,
    pub exam_id: i64,
    pub name: String,
    pub college_name: String,
    pub address: String,
    pub aadhaar_number: String,
    pub age: i64,
}

/// DTO for a student registering for an exam.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterExamRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub college_name: String,
    #[validate(length(min = 1, max = 1000))]
    pub address: String,
    #[validate(custom(function = validate_aadhaar))]
    pub aadhaar_number: String,
    #[validate(range(min = 0, max = 150))]
    pub age: i64,
    #[validate(length(min = 1, max = 50))]
    pub education_level: String,
}

fn validate_aadhaar(value: &str) -> Result<(), ValidationError> {
    if !AADHAAR_RE.is_match(value) {
        let mut err = ValidationError::new("invalid_aadhaar");
        err.message = Some("Aadhaar number must be exactly 12 digits".into());
        return Err(err);
    }
    Ok(())
}

/// Reason a registration was refused. The message is the user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Ineligibility {
    #[error("You are not eligible for this exam due to age criteria.")]
    Age,
    #[error("You are not eligible for this exam due to education criteria.")]
    Education,
    #[error("Your college is not eligible for this exam.")]
    College,
}

/// Applies the eligibility rules in order: age range (inclusive), exact
/// education level, then college whitelist when the exam has one.
/// The first failing rule is reported.
pub fn check_eligibility(exam: &Exam, req: &RegisterExamRequest) -> Result<(), Ineligibility> {
    if req.age < exam.age_min || req.age > exam.age_max {
        return Err(Ineligibility::Age);
    }
    if exam.education_level != req.education_level {
        return Err(Ineligibility::Education);
    }
    if !exam.eligible_colleges.is_empty()
        && !exam.eligible_colleges.iter().any(|c| c == &req.college_name)
    {
        return Err(Ineligibility::College);
    }
    Ok(())
}
