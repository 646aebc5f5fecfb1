pub(crate) mod config;
pub(crate) mod controller;
pub(crate) mod decay;
pub(crate) mod session;
