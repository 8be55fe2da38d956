//! Product field validation utilities

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during product validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProductValidationError {
    #[error("Product name cannot be empty")]
    EmptyName,

    #[error("Product name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Stock cannot be negative")]
    NegativeStock,

    #[error("Price cannot be negative")]
    NegativePrice,

    #[error("Description exceeds maximum length of {0} characters")]
    DescriptionTooLong(usize),
}

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Validate a product name
pub fn validate_name(name: &str) -> Result<(), ProductValidationError> {
    if name.trim().is_empty() {
        return Err(ProductValidationError::EmptyName);
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ProductValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a stock count
pub fn validate_stock(stock: i32) -> Result<(), ProductValidationError> {
    if stock < 0 {
        return Err(ProductValidationError::NegativeStock);
    }

    Ok(())
}

/// Validate a price. Zero is allowed (donations are listed at 0).
pub fn validate_price(price: Decimal) -> Result<(), ProductValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ProductValidationError::NegativePrice);
    }

    Ok(())
}

/// Validate an optional description
pub fn validate_description(description: &str) -> Result<(), ProductValidationError> {
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(ProductValidationError::DescriptionTooLong(
            MAX_DESCRIPTION_LENGTH,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_name() {
        assert!(validate_name("Calculus textbook").is_ok());
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(validate_name("  "), Err(ProductValidationError::EmptyName));
    }

    #[test]
    fn test_name_too_long() {
        let long = "a".repeat(101);
        assert_eq!(
            validate_name(&long),
            Err(ProductValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(15).is_ok());
        assert_eq!(
            validate_stock(-1),
            Err(ProductValidationError::NegativeStock)
        );
    }

    #[test]
    fn test_price() {
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::new(1050, 2)).is_ok());
        assert_eq!(
            validate_price(Decimal::new(-1, 0)),
            Err(ProductValidationError::NegativePrice)
        );
    }

    #[test]
    fn test_description_too_long() {
        let long = "a".repeat(2001);
        assert_eq!(
            validate_description(&long),
            Err(ProductValidationError::DescriptionTooLong(2000))
        );
    }
}
