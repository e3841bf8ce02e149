mod name;

pub use name::{IntoName, Name};
