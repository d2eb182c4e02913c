//! Pure domain logic: ABI handling and numeric conversion

pub mod abi;
pub mod numeric;
