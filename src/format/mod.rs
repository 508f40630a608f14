//! Pure, stateless display and normalization helpers.

pub mod names;
pub mod numbers;
pub mod slug;

pub use names::{format_program_name, is_acronym, title_case, ACRONYMS};
pub use numbers::{format_count, format_money, format_money_full, format_percent};
pub use slug::slugify;
