pub mod command_key;
