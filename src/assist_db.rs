pub mod db_interfaces;
pub mod models;
