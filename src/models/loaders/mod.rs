pub mod respondent_loader;

pub use respondent_loader::{load_respondents, parse_respondents_json, parse_respondents_toml};
