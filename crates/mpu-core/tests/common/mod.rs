pub mod memory_target;
