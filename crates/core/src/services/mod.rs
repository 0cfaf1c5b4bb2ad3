//! Match resolution, display and porting services.

pub mod porting;
pub mod resolver;
pub mod session;
pub mod table;

pub use porting::*;
pub use resolver::*;
pub use session::*;
pub use table::*;
