pub mod controller;
pub mod view;

pub use controller::ListController;
pub use view::ListView;
