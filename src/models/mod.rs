pub mod category;
pub mod prioritized;
pub mod question;
pub mod review_item;
pub mod weakness;
pub mod wrong_answer;

pub use category::Category;
pub use prioritized::{PrioritizedProblem, PriorityFactors, ReviewPlan, Source, Tier};
pub use question::{Question, QuestionId};
pub use review_item::{Outcome, ReviewEvent, ReviewItem};
pub use weakness::{CategoryAccuracy, WeaknessReport};
pub use wrong_answer::{Attempt, WrongAnswerDetails, WrongAnswerRecord};
