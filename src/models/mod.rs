pub mod loaders;
pub mod outcome;
pub mod respondent;
pub mod section;

pub use loaders::load_respondents;
pub use outcome::{
    AppliedAnswer, CarouselCard, CarouselOutcome, RunOutcome, SectionOutcome, SectionStatus,
    StrategyAttemptResult, SurveyLogEntry,
};
pub use respondent::Respondent;
pub use section::{section_plan, Section, SectionKind};
