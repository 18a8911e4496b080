// src/models/exam.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Represents the 'exams' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Exam {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,

    /// Inclusive age bounds for registration.
    pub age_min: i64,
    pub age_max: i64,

    /// Must match the registrant's education level exactly.
    pub education_level: String,

    pub start_time: Option<DateTime<Utc>>,

    /// Loaded from 'exam_colleges'. Empty means every college is eligible.
    #[sqlx(skip)]
    pub eligible_colleges: Vec<String>,
}

/// DTO for creating a new exam.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = validate_age_range))]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 150))]
    pub age_min: i64,
    #[validate(range(min = 0, max = 150))]
    pub age_max: i64,
    #[validate(length(min = 1, max = 50))]
    pub education_level: String,
    #[serde(default)]
    #[validate(custom(function = validate_colleges))]
    pub eligible_colleges: Vec<String>,
}

impl CreateExamRequest {
    /// Trimmed, non-empty, de-duplicated college names in submission order.
    pub fn normalized_colleges(&self) -> Vec<String> {
        let mut colleges: Vec<String> = Vec::with_capacity(self.eligible_colleges.len());
        for college in &self.eligible_colleges {
            let college = college.trim();
            if !college.is_empty() && !colleges.iter().any(|c| c == college) {
                colleges.push(college.to_string());
            }
        }
        colleges
    }
}

fn validate_age_range(req: &CreateExamRequest) -> Result<(), ValidationError> {
    if req.age_min > req.age_max {
        let mut err = ValidationError::new("age_range");
        err.message = Some("age_min must not exceed age_max".into());
        return Err(err);
    }
    Ok(())
}

fn validate_colleges(colleges: &[String]) -> Result<(), ValidationError> {
    if colleges.len() > 500 {
        return Err(ValidationError::new("too_many_colleges"));
    }
    for college in colleges {
        if college.len() > 100 {
            return Err(ValidationError::new("college_name_too_long"));
        }
    }
    Ok(())
}

/// DTO for scheduling an exam.
#[derive(Debug, Deserialize)]
pub struct ScheduleExamRequest {
    pub start_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(age_min: i64, age_max: i64) -> CreateExamRequest {
        CreateExamRequest {
            name: "Entrance".to_string(),
            description: None,
            age_min,
            age_max,
            education_level: "graduate".to_string(),
            eligible_colleges: vec![],
        }
    }

    #[test]
    fn inverted_age_range_is_rejected() {
        assert!(request(30, 18).validate().is_err());
        assert!(request(18, 18).validate().is_ok());
    }

    #[test]
    fn colleges_are_trimmed_and_deduplicated() {
        let mut req = request(18, 30);
        req.eligible_colleges = vec![
            " MIT".to_string(),
            "IIT".to_string(),
            "".to_string(),
            "MIT ".to_string(),
        ];
        assert_eq!(req.normalized_colleges(), vec!["MIT", "IIT"]);
    }
}
