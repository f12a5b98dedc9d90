pub mod edit;
pub mod resume;

pub use edit::RecordEdit;
pub use resume::{Award, Education, Experience, PersonalInfo, Project, ResumeRecord, Skills};
