pub mod library;
pub mod onboard;
pub mod run;
