// src/models/mcq.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Represents the 'mcqs' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mcq {
    pub id: i64,
    pub exam_id: i64,
    pub question: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,

    /// The option text a student must submit verbatim.
    pub correct_answer: String,
}

/// DTO for sending a question to a student (excludes the answer).
#[derive(Debug, Serialize)]
pub struct PublicMcq {
    pub id: i64,
    pub question: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
}

impl From<Mcq> for PublicMcq {
    fn from(mcq: Mcq) -> Self {
        Self {
            id: mcq.id,
            question: mcq.question,
            option1: mcq.option1,
            option2: mcq.option2,
            option3: mcq.option3,
            option4: mcq.option4,
        }
    }
}

/// DTO for adding a question to an exam.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = validate_correct_answer))]
pub struct CreateMcqRequest {
    #[validate(length(min = 1, max = 255))]
    pub question: String,
    #[validate(length(min = 1, max = 100))]
    pub option1: String,
    #[validate(length(min = 1, max = 100))]
    pub option2: String,
    #[validate(length(min = 1, max = 100))]
    pub option3: String,
    #[validate(length(min = 1, max = 100))]
    pub option4: String,
    #[validate(length(min = 1, max = 100))]
    pub correct_answer: String,
}

impl CreateMcqRequest {
    fn options(&self) -> [&str; 4] {
        [&self.option1, &self.option2, &self.option3, &self.option4]
    }
}

/// The correct answer is compared verbatim at grading time, so it has to be
/// one of the four options exactly.
fn validate_correct_answer(req: &CreateMcqRequest) -> Result<(), ValidationError> {
    if !req.options().contains(&req.correct_answer.as_str()) {
        let mut err = ValidationError::new("correct_answer_not_an_option");
        err.message = Some("correct_answer must equal one of the four options".into());
        return Err(err);
    }
    Ok(())
}
