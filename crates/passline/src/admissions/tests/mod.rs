mod common;
mod drain_table;
