pub mod progress;
pub mod select;
pub mod table;

pub mod prelude {
    pub use super::progress::ProgressLine;
    pub use super::select::{connect_hint, prompt_selection};
    pub use super::table::{
        Table, cities_table, countries_table, failure_summary, fastest_table, next_fastest_table,
        providers_table,
    };
}
