pub mod experts;
pub mod home;
pub mod marketplace;
pub mod result;
pub mod upload;
