pub mod info;
pub mod port;
pub mod show;
pub mod util;

pub use info::*;
pub use port::*;
pub use show::*;
pub use util::*;
