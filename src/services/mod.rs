pub mod badge_service;
pub mod storage_service;
