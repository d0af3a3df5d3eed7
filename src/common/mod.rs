pub mod consts;
pub mod errors;
pub mod request;
pub mod strings;
