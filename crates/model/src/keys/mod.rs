pub mod partition_key;
