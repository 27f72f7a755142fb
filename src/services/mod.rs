pub mod keys;
pub mod rooms;
pub mod storage_gateway;
pub mod stream_service;
