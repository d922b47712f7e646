pub mod evaluation;
pub mod question;
pub mod session;
pub use evaluation::{Evaluation, ScoreSummary};
pub use question::{Question, QuestionSet};
pub use session::{SessionPhase, SessionState, SourceDocument};
