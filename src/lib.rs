pub mod assembler;
pub mod catalog;
pub mod filter;
pub mod partition;
pub mod request;
pub mod translator;
