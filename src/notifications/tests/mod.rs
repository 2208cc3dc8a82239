//! Test modules for queue listeners
