mod cash_card;
mod money;
mod page;
mod principal;

pub use cash_card::*;
pub use money::*;
pub use page::*;
pub use principal::*;
