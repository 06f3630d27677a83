pub mod db;
pub mod security;
pub mod storage;
