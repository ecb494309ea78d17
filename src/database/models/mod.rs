pub mod campaign;
pub mod equipment;
pub mod equipment_history;
pub mod favorite;
pub mod news;
pub mod notification;
pub mod publication;
pub mod readings;
pub mod user;

pub use campaign::*;
pub use equipment::*;
pub use equipment_history::*;
pub use favorite::*;
pub use news::*;
pub use notification::*;
pub use publication::*;
pub use readings::*;
pub use user::*;
