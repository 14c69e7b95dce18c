pub mod alert;

pub use alert::{Alert, Side};
