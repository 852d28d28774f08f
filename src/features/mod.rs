pub mod normalizers;
pub mod patterns;
pub mod value_extractor;
