pub mod controller;

pub use controller::TaskController;
