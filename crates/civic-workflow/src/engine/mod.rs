mod submission_engine;

pub use submission_engine::SubmissionEngine;
