use crate::error::PrizmError;

pub type PrizmResult<T> = Result<T, PrizmError>;
