//! Product domain: listings, images and conditions

mod entity;
mod repository;
pub mod validation;

pub use entity::{
    NewProduct, NewProductImage, Product, ProductCondition, ProductImage, ProductOverview,
    ProductPatch,
};
pub use repository::ProductRepository;
pub use validation::ProductValidationError;
