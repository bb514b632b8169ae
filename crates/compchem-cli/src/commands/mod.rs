pub mod logs;
pub mod release;
pub mod run;
pub mod version;
