pub mod clean;
pub mod combine;
pub mod ecl;
pub mod history;
pub mod recommend;
