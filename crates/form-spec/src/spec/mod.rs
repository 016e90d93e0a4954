pub mod form;
pub mod question;

pub use form::FormSpec;
pub use question::{QuestionSpec, QuestionType, ValueShape};
