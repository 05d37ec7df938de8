pub mod completions;
pub mod goals;
pub mod summary;
pub mod week;

pub use completions::CompletionService;
pub use goals::GoalService;
pub use summary::SummaryService;
pub use week::WeekWindow;
