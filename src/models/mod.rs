pub mod enums;
pub mod industry_list;
pub mod report;

pub use enums::*;
pub use industry_list::*;
pub use report::*;
