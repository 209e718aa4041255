pub mod resolve;
pub mod rollback;
pub mod run;
pub mod status;
